//! Prelude loading and registration of module declarations

use forge_ast::{Ident, Node, Span};

use crate::analyzer::SemanticAnalyzer;
use crate::error::{ErrorKind, SemanticError};
use crate::modules::{prelude_modules, ModuleInfo};
use crate::symbols::{Symbol, SymbolError, SymbolTable};

impl SemanticAnalyzer<'_> {
    /// Register the language's prelude modules into the root scope
    pub(crate) fn load_prelude(&mut self) {
        debug_assert_eq!(self.depth(), SymbolTable::ROOT_DEPTH);
        let language = self.config.language;

        for path in prelude_modules(language) {
            match self.loader.load_module(path) {
                Ok(module) => {
                    tracing::debug!(%path, "registering prelude module");
                    self.record_module(&module);
                    self.register_module_decls(&module, None);
                }
                Err(err) if self.config.tolerate_missing_prelude => {
                    tracing::debug!(%path, %err, "prelude module unavailable, skipping");
                }
                Err(err) => self.report(
                    ErrorKind::ModuleLoadFailure {
                        path: path.to_string(),
                        reason: err.to_string(),
                    },
                    Span::default(),
                ),
            }
        }
    }

    /// Declare every public declaration of `module` into the current scope.
    ///
    /// Prelude registration (`import_span` of `None`) skips names that are
    /// already declared; an explicit import reports them.
    pub(crate) fn register_module_decls(&mut self, module: &ModuleInfo, import_span: Option<Span>) {
        for decl in module.public_decls() {
            let symbol = Self::module_symbol(decl, self.config.language);
            let name = symbol.name.clone();
            match self.symbols.declare(symbol) {
                Ok(_) => {}
                Err(SymbolError::Duplicate(_)) if import_span.is_none() => {
                    tracing::debug!(module = %module.path, %name, "prelude name already declared, skipping");
                }
                Err(err) => {
                    let span = import_span.unwrap_or_default();
                    self.report_error(SemanticError::new(err.into(), span));
                }
            }
        }
    }

    /// Resolve `alias.member` against a module imported under an alias
    pub(crate) fn module_member(
        &mut self,
        module_path: &str,
        member: &Node<Ident>,
    ) -> Result<Symbol, SemanticError> {
        let undefined = || {
            SemanticError::new(
                ErrorKind::UndefinedSymbol(format!("{}.{}", module_path, member.value.name)),
                member.span,
            )
        };
        let module = self.loaded_module(module_path).ok_or_else(undefined)?;
        let decl = module.public_decl(&member.value.name).ok_or_else(undefined)?;
        Ok(Self::module_symbol(decl, self.config.language))
    }
}
