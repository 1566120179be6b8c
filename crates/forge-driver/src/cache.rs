//! Cached module loading with circular-import detection

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use forge_ast::Program;
use forge_sema::{ModuleError, ModuleInfo, ModuleLoader};

use crate::dep_graph::DepGraph;
use crate::resolver::ModuleResolver;

/// Where parsed modules come from. Parsing itself happens outside the
/// driver; a source hands back the finished AST for a canonical path.
pub trait ModuleSource {
    fn fetch(&mut self, path: &str) -> Result<Program, ModuleError>;
}

/// In-memory modules keyed by canonical path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    programs: HashMap<String, Program>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, program: Program) {
        self.programs.insert(path.into(), program);
    }

    pub fn with(mut self, path: impl Into<String>, program: Program) -> Self {
        self.insert(path, program);
        self
    }
}

impl ModuleSource for MemorySource {
    fn fetch(&mut self, path: &str) -> Result<Program, ModuleError> {
        self.programs
            .get(path)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound(path.to_string()))
    }
}

/// Source backed by a callback, typically one that reads and parses a file
pub struct FnSource<F>(pub F);

impl<F> ModuleSource for FnSource<F>
where
    F: FnMut(&str) -> Result<Program, ModuleError>,
{
    fn fetch(&mut self, path: &str) -> Result<Program, ModuleError> {
        (self.0)(path)
    }
}

/// Module loader that fetches each module at most once.
///
/// Loading a module also loads everything it imports, so an import cycle
/// anywhere below a requested module is found when that module is first
/// requested. Modules that failed to load are not cached.
pub struct ModuleCache<S> {
    source: S,
    resolver: ModuleResolver,
    modules: HashMap<String, Rc<ModuleInfo>>,
    /// Modules currently being loaded, outermost first
    loading: Vec<String>,
    graph: DepGraph,
}

impl<S: ModuleSource> ModuleCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            resolver: ModuleResolver::new(),
            modules: HashMap::new(),
            loading: Vec::new(),
            graph: DepGraph::new(),
        }
    }

    /// Dependency graph of every module loaded so far
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn get(&self, path: &str) -> Option<&Rc<ModuleInfo>> {
        self.modules.get(path)
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve `specifier` relative to the module being loaded, if any
    pub fn resolve(&self, specifier: &str) -> Result<String, ModuleError> {
        self.resolver
            .resolve(specifier, self.loading.last().map(String::as_str))
    }

    /// Mark `path` as the module whose imports are being resolved.
    /// Paired with [`ModuleCache::leave`].
    pub(crate) fn enter(&mut self, path: String) {
        self.loading.push(path);
    }

    pub(crate) fn leave(&mut self) {
        self.loading.pop();
    }

    /// Record an analyzed entry module and its resolved imports in the graph
    pub(crate) fn record_entry(&mut self, path: &str, program: &Program) {
        let dependencies = self.resolve_imports(path, program);
        let exports = Self::exports_of(&ModuleInfo::new(path, program.clone()));
        self.graph.add_module(path, dependencies, exports);
        self.graph.set_entry(path);
    }

    fn resolve_imports(&self, importer: &str, program: &Program) -> Vec<String> {
        program
            .imports()
            .filter_map(|import| self.resolver.resolve(&import.path, Some(importer)).ok())
            .collect()
    }

    fn exports_of(module: &ModuleInfo) -> HashSet<String> {
        module
            .public_decls()
            .map(|decl| decl.value.name().value.name.clone())
            .collect()
    }

    fn load_path(&mut self, path: String) -> Result<Rc<ModuleInfo>, ModuleError> {
        if let Some(module) = self.modules.get(&path) {
            tracing::debug!(%path, "module cache hit");
            return Ok(Rc::clone(module));
        }

        if let Some(start) = self.loading.iter().position(|p| *p == path) {
            let mut cycle = self.loading[start..].to_vec();
            cycle.push(path);
            let err = ModuleError::Circular(cycle);
            tracing::warn!(%err, "import cycle");
            return Err(err);
        }

        tracing::debug!(%path, "module cache miss");
        let program = self.source.fetch(&path)?;
        let dependencies = self.resolve_imports(&path, &program);

        self.loading.push(path.clone());
        let loaded = self.load_dependencies(&dependencies);
        self.loading.pop();
        loaded?;

        let module = Rc::new(ModuleInfo::new(path.clone(), program));
        self.graph.add_module(path.clone(), dependencies, Self::exports_of(&module));
        self.modules.insert(path, Rc::clone(&module));
        Ok(module)
    }

    fn load_dependencies(&mut self, dependencies: &[String]) -> Result<(), ModuleError> {
        for dependency in dependencies {
            self.load_path(dependency.clone())?;
        }
        Ok(())
    }
}

impl<S: ModuleSource> ModuleLoader for ModuleCache<S> {
    fn load_module(&mut self, path: &str) -> Result<Rc<ModuleInfo>, ModuleError> {
        let path = self.resolve(path)?;
        self.load_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_ast::{ImportDecl, ModuleItem, Node, Span};
    use std::cell::Cell;

    fn program_importing(paths: &[&str]) -> Program {
        let items = paths
            .iter()
            .map(|path| {
                Node::new(
                    ModuleItem::Import(ImportDecl {
                        path: path.to_string(),
                        alias: None,
                    }),
                    Span::default(),
                )
            })
            .collect();
        Program {
            items,
            span: Span::default(),
        }
    }

    #[test]
    fn test_loads_once() {
        let fetches = Cell::new(0);
        let mut cache = ModuleCache::new(FnSource(|path: &str| {
            fetches.set(fetches.get() + 1);
            match path {
                "core/Maybe" => Ok(program_importing(&[])),
                other => Err(ModuleError::NotFound(other.to_string())),
            }
        }));

        let first = cache.load_module("core/Maybe").unwrap();
        let second = cache.load_module("./core//Maybe.rf").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(fetches.get(), 1);
        assert!(cache.load_module("core/Missing").is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_loads_dependencies() {
        let source = MemorySource::new()
            .with("app/main", program_importing(&["./util", "core/Maybe"]))
            .with("app/util", program_importing(&["core/Maybe"]))
            .with("core/Maybe", program_importing(&[]));
        let mut cache = ModuleCache::new(source);

        cache.load_module("app/main").unwrap();
        assert!(cache.is_cached("app/util"));
        assert!(cache.is_cached("core/Maybe"));
        assert_eq!(
            cache.graph().topological_sort().unwrap(),
            vec!["core/Maybe", "app/util", "app/main"]
        );
    }

    #[test]
    fn test_circular_import() {
        let source = MemorySource::new()
            .with("a", program_importing(&["b"]))
            .with("b", program_importing(&["c"]))
            .with("c", program_importing(&["a"]));
        let mut cache = ModuleCache::new(source);

        let err = cache.load_module("a").unwrap_err();
        assert_eq!(
            err,
            ModuleError::Circular(vec!["a".into(), "b".into(), "c".into(), "a".into()])
        );
        assert!(cache.is_empty());
        // The loading stack unwinds, so later requests start clean
        assert!(matches!(cache.load_module("b"), Err(ModuleError::Circular(_))));
    }

    #[test]
    fn test_invalid_specifier() {
        let mut cache = ModuleCache::new(MemorySource::new());
        assert!(matches!(
            cache.load_module("../outside"),
            Err(ModuleError::InvalidPath { .. })
        ));
    }
}
