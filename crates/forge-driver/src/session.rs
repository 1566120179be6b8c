//! Analysis sessions sharing one module cache

use forge_ast::Program;
use forge_sema::{Analysis, AnalyzerConfig, Language, ModuleError, SemanticAnalyzer};

use crate::cache::{ModuleCache, ModuleSource};

/// Runs independent analyses against a shared module cache.
///
/// Every `check` builds a fresh analyzer, so symbol tables, ownership
/// state and diagnostics never carry over between programs; only parsed
/// modules are reused.
pub struct Session<S> {
    config: AnalyzerConfig,
    cache: ModuleCache<S>,
}

impl<S: ModuleSource> Session<S> {
    pub fn new(config: AnalyzerConfig, source: S) -> Self {
        Self {
            config,
            cache: ModuleCache::new(source),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ModuleCache<S> {
        &self.cache
    }

    /// Analyze `program`, the module at `entry`. Relative imports resolve
    /// against `entry`, and a module importing `entry` back is circular.
    pub fn check(&mut self, entry: &str, program: &Program) -> Analysis {
        let config = self.config_for(entry);
        let entry = match self.cache.resolve(entry) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(%entry, %err, "unresolvable entry path, resolving imports from the root");
                String::new()
            }
        };
        let _span = tracing::debug_span!("check", entry = %entry, language = %config.language).entered();

        let has_entry = !entry.is_empty();
        if has_entry {
            self.cache.enter(entry.clone());
        }
        let analysis = SemanticAnalyzer::new(config, &mut self.cache).analyze(program);
        if has_entry {
            self.cache.leave();
            self.cache.record_entry(&entry, program);
        }

        tracing::debug!(errors = analysis.diagnostics.len(), "check finished");
        analysis
    }

    /// Load order of every module seen so far, dependencies first
    pub fn load_order(&self) -> Result<Vec<String>, ModuleError> {
        self.cache.graph().topological_sort()
    }

    /// The session's configuration, with the language taken from the
    /// entry's extension when it names one
    fn config_for(&self, entry: &str) -> AnalyzerConfig {
        let mut config = self.config.clone();
        if let Some(language) = entry.rsplit_once('.').and_then(|(_, ext)| Language::from_extension(ext)) {
            config.language = language;
        }
        config
    }
}
