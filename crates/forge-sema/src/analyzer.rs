//! Main semantic analyzer struct

use std::rc::Rc;
use forge_ast::{ImportDecl, ModuleItem, Node, Program, Span};

use crate::config::AnalyzerConfig;
use crate::error::{Diagnostics, ErrorKind, SemanticError};
use crate::modes::{ContextModes, Mode};
use crate::modules::{ModuleInfo, ModuleLoader};
use crate::ownership::OwnershipTracker;
use crate::symbols::{Symbol, SymbolError, SymbolTable};
use crate::types::Type;

/// Outcome of analyzing one program
#[derive(Debug)]
pub struct Analysis {
    /// Errors in the order they were found
    pub diagnostics: Vec<SemanticError>,
    /// Root and module scopes after analysis
    pub symbols: SymbolTable,
    /// Every module loaded for the prelude or imports, in load order
    pub modules: Vec<Rc<ModuleInfo>>,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_error(&self, pred: impl Fn(&ErrorKind) -> bool) -> bool {
        self.diagnostics.iter().any(|err| pred(&err.kind))
    }

    pub fn module_paths(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.path.as_str())
    }
}

/// Single-pass semantic analyzer
///
/// One analyzer checks one program. The symbol table, ownership tracker
/// and mode stack all belong to the run, so independent analyses never
/// share state.
pub struct SemanticAnalyzer<'a> {
    pub(crate) config: AnalyzerConfig,
    pub(crate) symbols: SymbolTable,
    pub(crate) tracker: OwnershipTracker,
    pub(crate) modes: ContextModes,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) loader: &'a mut dyn ModuleLoader,
    pub(crate) modules: Vec<Rc<ModuleInfo>>,
    /// Declared return type of the routine being checked
    pub(crate) current_return_type: Option<Type>,
    pub(crate) loop_depth: usize,
    /// Set on internal errors; stops the traversal
    aborted: bool,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(config: AnalyzerConfig, loader: &'a mut dyn ModuleLoader) -> Self {
        Self {
            config,
            symbols: SymbolTable::new(),
            tracker: OwnershipTracker::new(),
            modes: ContextModes::new(),
            diagnostics: Diagnostics::new(),
            loader,
            modules: Vec::new(),
            current_return_type: None,
            loop_depth: 0,
            aborted: false,
        }
    }

    /// Analyze `program`, returning every error found
    #[tracing::instrument(skip_all, fields(language = %self.config.language))]
    pub fn analyze(mut self, program: &Program) -> Analysis {
        self.load_prelude();

        // The module scope stays on the stack so callers can inspect it
        let module_depth = self.symbols.push_scope();
        debug_assert_eq!(module_depth, SymbolTable::MODULE_DEPTH);

        for item in &program.items {
            if self.aborted {
                break;
            }
            if let Err(err) = self.check_module_item(item) {
                self.report_error(err);
            }
        }

        tracing::debug!(
            errors = self.diagnostics.len(),
            modules = self.modules.len(),
            "analysis finished"
        );
        Analysis {
            diagnostics: self.diagnostics.into_vec(),
            symbols: self.symbols,
            modules: self.modules,
        }
    }

    fn check_module_item(&mut self, item: &Node<ModuleItem>) -> Result<(), SemanticError> {
        match &item.value {
            ModuleItem::Import(import) => self.check_import(import, item.span),
            ModuleItem::Decl(decl) => self.check_decl(decl),
        }
    }

    /// Load an imported module and bring its public declarations into scope
    fn check_import(&mut self, import: &ImportDecl, span: Span) -> Result<(), SemanticError> {
        let module = self.loader.load_module(&import.path).map_err(|err| {
            SemanticError::new(
                ErrorKind::ModuleLoadFailure {
                    path: import.path.clone(),
                    reason: err.to_string(),
                },
                span,
            )
        })?;
        tracing::debug!(path = %module.path, alias = ?import.alias.as_ref().map(|a| &a.value.name), "import");
        self.record_module(&module);

        match &import.alias {
            Some(alias) => {
                let symbol = Symbol::module_alias(alias.value.name.clone(), module.path.clone(), alias.span);
                self.declare(symbol)?;
            }
            None => self.register_module_decls(&module, Some(span)),
        }
        Ok(())
    }

    pub(crate) fn record_module(&mut self, module: &Rc<ModuleInfo>) {
        if !self.modules.iter().any(|m| m.path == module.path) {
            self.modules.push(Rc::clone(module));
        }
    }

    pub(crate) fn loaded_module(&self, path: &str) -> Option<Rc<ModuleInfo>> {
        self.modules.iter().find(|m| m.path == path).cloned()
    }

    // =========================================================================
    // Shared state helpers
    // =========================================================================

    pub(crate) fn report(&mut self, kind: ErrorKind, span: Span) {
        self.diagnostics.report(kind, span);
    }

    pub(crate) fn report_error(&mut self, err: SemanticError) {
        if err.is_internal() {
            self.aborted = true;
        }
        self.diagnostics.push(err);
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub(crate) fn depth(&self) -> usize {
        self.symbols.depth()
    }

    /// Declare into the current scope, mapping a clash to `DuplicateDeclaration`
    pub(crate) fn declare(&mut self, symbol: Symbol) -> Result<(), SemanticError> {
        let span = symbol.span;
        self.symbols
            .declare(symbol)
            .map(|_| ())
            .map_err(|err| SemanticError::new(err.into(), span))
    }

    /// Run `f` inside a fresh scope; the scope is popped even when `f` fails
    pub(crate) fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.symbols.push_scope();
        let result = f(self);

        for token in self.tracker.retire_depth(depth) {
            tracing::trace!(token = %token.key, "retired with scope");
        }
        if let Err(err) = self.symbols.pop_scope() {
            self.internal_error(err, Span::default());
        }
        result
    }

    pub(crate) fn with_mode<R>(&mut self, mode: Mode, f: impl FnOnce(&mut Self) -> R) -> R {
        self.modes.push(mode);
        let result = f(self);
        self.modes.pop(mode);
        result
    }

    pub(crate) fn internal_error(&mut self, err: SymbolError, span: Span) {
        tracing::error!(%err, "symbol table corrupted");
        self.report_error(SemanticError::new(ErrorKind::Internal(err.to_string()), span));
    }
}
