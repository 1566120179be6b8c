//! Import dependency graph between loaded modules

use std::collections::{BTreeMap, HashSet, VecDeque};

use forge_sema::ModuleError;

/// Node in the dependency graph representing a module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNode {
    /// Canonical module path
    pub path: String,
    /// Modules this module imports (dependencies)
    pub dependencies: Vec<String>,
    /// Public declaration names
    pub exports: HashSet<String>,
}

/// Dependency graph for tracking module imports
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    /// Keyed by path; ordered so traversals are deterministic
    modules: BTreeMap<String, ModuleNode>,
    /// Entry point module
    entry: Option<String>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entry(&mut self, path: impl Into<String>) {
        self.entry = Some(path.into());
    }

    /// Add a module, replacing any earlier node for the same path
    pub fn add_module(&mut self, path: impl Into<String>, dependencies: Vec<String>, exports: HashSet<String>) {
        let path = path.into();
        let node = ModuleNode {
            path: path.clone(),
            dependencies,
            exports,
        };
        self.modules.insert(path, node);
    }

    pub fn get_module(&self, path: &str) -> Option<&ModuleNode> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Detect cycles; the error lists the cycle from its first module back to itself
    pub fn detect_cycles(&self) -> Result<(), ModuleError> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for path in self.modules.keys() {
            if !visited.contains(path.as_str()) {
                if let Some(cycle) = self.detect_cycle_util(path, &mut visited, &mut stack) {
                    return Err(ModuleError::Circular(cycle));
                }
            }
        }
        Ok(())
    }

    /// Depth-first search; `stack` holds the current import chain
    fn detect_cycle_util<'a>(
        &'a self,
        current: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(current);
        stack.push(current);

        if let Some(node) = self.modules.get(current) {
            for dep in &node.dependencies {
                if let Some(start) = stack.iter().position(|p| *p == dep.as_str()) {
                    let mut cycle: Vec<String> = stack[start..].iter().map(|p| p.to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                if !visited.contains(dep.as_str()) {
                    if let Some(cycle) = self.detect_cycle_util(dep, visited, stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        stack.pop();
        None
    }

    /// Modules in load order: every module after the modules it imports
    pub fn topological_sort(&self) -> Result<Vec<String>, ModuleError> {
        self.detect_cycles()?;

        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (path, node) in &self.modules {
            // Dependencies outside the graph (failed loads) do not hold a module back
            let count = node
                .dependencies
                .iter()
                .filter(|d| self.modules.contains_key(d.as_str()))
                .count();
            in_degree.insert(path, count);
            for dep in &node.dependencies {
                dependents.entry(dep.as_str()).or_default().push(path);
            }
        }

        // Kahn's algorithm
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(path, _)| *path)
            .collect();
        let mut result = Vec::with_capacity(self.modules.len());

        while let Some(current) = queue.pop_front() {
            result.push(current.to_string());
            for dependent in dependents.get(current).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        Ok(result)
    }

    pub fn all_modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
