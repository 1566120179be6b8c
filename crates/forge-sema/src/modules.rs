//! Module loading interface and prelude module lists

use std::collections::HashMap;
use std::rc::Rc;
use forge_ast::{Decl, Node, Program, Visibility};
use thiserror::Error;

use crate::config::Language;

/// A parsed module handed to the analyzer by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    /// Normalized module path, e.g. `core/Maybe`
    pub path: String,
    pub program: Program,
}

impl ModuleInfo {
    pub fn new(path: impl Into<String>, program: Program) -> Self {
        Self {
            path: path.into(),
            program,
        }
    }

    /// Declarations visible to importers
    pub fn public_decls(&self) -> impl Iterator<Item = &Node<Decl>> {
        self.program
            .decls()
            .filter(|decl| decl.value.visibility() == Visibility::Public)
    }

    pub fn public_decl(&self, name: &str) -> Option<&Node<Decl>> {
        self.public_decls()
            .find(|decl| decl.value.name().value.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module '{0}' not found")]
    NotFound(String),
    #[error("circular import: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    #[error("invalid module path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Source of parsed modules for imports and the prelude
pub trait ModuleLoader {
    fn load_module(&mut self, path: &str) -> Result<Rc<ModuleInfo>, ModuleError>;
}

/// Loader for programs analyzed in isolation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModules;

impl ModuleLoader for NoModules {
    fn load_module(&mut self, path: &str) -> Result<Rc<ModuleInfo>, ModuleError> {
        Err(ModuleError::NotFound(path.to_string()))
    }
}

/// Fixed set of preloaded modules keyed by path
impl ModuleLoader for HashMap<String, Rc<ModuleInfo>> {
    fn load_module(&mut self, path: &str) -> Result<Rc<ModuleInfo>, ModuleError> {
        self.get(path)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound(path.to_string()))
    }
}

/// Prelude modules shared by both languages
pub const CORE_PRELUDE: &[&str] = &["core/Maybe", "core/Result", "core/Lookup"];

/// Prelude modules only Suflae programs receive
pub const SUFLAE_PRELUDE: &[&str] = &[
    "numeric/Integer",
    "numeric/Decimal",
    "text/Text",
    "collections/List",
    "collections/Dict",
    "collections/Set",
    "collections/FixedList",
    "collections/FixedDict",
    "collections/FixedSet",
    "collections/ValueList",
    "collections/ValueDict",
    "collections/ValueSet",
];

/// Prelude module paths for `language`, in load order
pub fn prelude_modules(language: Language) -> impl Iterator<Item = &'static str> {
    let extra: &[&str] = match language {
        Language::RazorForge => &[],
        Language::Suflae => SUFLAE_PRELUDE,
    };
    CORE_PRELUDE.iter().chain(extra.iter()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_ast::{Ident, ModuleItem, Span, TypeDecl};

    fn record(name: &str, visibility: Visibility) -> Node<ModuleItem> {
        let decl = Decl::Record(TypeDecl {
            name: Node::new(Ident::new(name), Span::default()),
            type_params: vec![],
            fields: vec![],
            visibility,
        });
        Node::new(ModuleItem::Decl(Node::new(decl, Span::default())), Span::default())
    }

    #[test]
    fn test_prelude_lists() {
        let rf: Vec<_> = prelude_modules(Language::RazorForge).collect();
        assert_eq!(rf, vec!["core/Maybe", "core/Result", "core/Lookup"]);

        let sf: Vec<_> = prelude_modules(Language::Suflae).collect();
        assert_eq!(sf.len(), CORE_PRELUDE.len() + SUFLAE_PRELUDE.len());
        assert!(sf.contains(&"collections/ValueSet"));
        assert!(sf.contains(&"numeric/Integer"));
    }

    #[test]
    fn test_public_decls() {
        let module = ModuleInfo::new(
            "core/Maybe",
            Program {
                items: vec![record("Maybe", Visibility::Public), record("Hidden", Visibility::Private)],
                span: Span::default(),
            },
        );
        let names: Vec<_> = module
            .public_decls()
            .map(|d| d.value.name().value.name.clone())
            .collect();
        assert_eq!(names, vec!["Maybe"]);
        assert!(module.public_decl("Hidden").is_none());
    }

    #[test]
    fn test_loaders() {
        assert_eq!(
            NoModules.load_module("core/Maybe").unwrap_err(),
            ModuleError::NotFound("core/Maybe".to_string())
        );

        let mut map = HashMap::new();
        map.insert(
            "a/b".to_string(),
            Rc::new(ModuleInfo::new("a/b", Program { items: vec![], span: Span::default() })),
        );
        assert_eq!(map.load_module("a/b").unwrap().path, "a/b");
        assert!(map.load_module("a/c").is_err());
    }

    #[test]
    fn test_circular_message() {
        let err = ModuleError::Circular(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "circular import: a -> b -> a");
    }
}
