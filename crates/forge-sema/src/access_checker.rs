//! Scoped-access constructs: viewing, hijacking, seizing, observing

use forge_ast::{AccessForm, Ident, Node, Span};

use crate::analyzer::SemanticAnalyzer;
use crate::error::ErrorKind;
use crate::modes::ModeRequirement;
use crate::ownership::{AccessKind, BindingKey};
use crate::symbols::Symbol;
use crate::types::Type;

impl SemanticAnalyzer<'_> {
    /// Check `body` inside a scope where `token` holds `form` access to `source`.
    ///
    /// The source is invalidated for the extent of `body` and restored once
    /// it finishes, whatever errors the body produced.
    pub(crate) fn with_access<R>(
        &mut self,
        form: AccessForm,
        source: &Node<Ident>,
        token: &Node<Ident>,
        span: Span,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let language = self.config.language;
        if !language.supports_access(form) {
            self.report(
                ErrorKind::UnsupportedConstruct {
                    construct: format!("'{}'", form),
                    language,
                },
                span,
            );
        }

        self.with_scope(|this| {
            let opened = this.begin_scoped_access(form, source, token);
            let result = body(this);
            if let Some(key) = opened {
                this.tracker.end_access(&key);
            }
            result
        })
    }

    /// Declare the token in the current scope and register the access.
    /// Returns the token key when the tracker accepted the access.
    fn begin_scoped_access(
        &mut self,
        form: AccessForm,
        source: &Node<Ident>,
        token: &Node<Ident>,
    ) -> Option<BindingKey> {
        let kind = AccessKind::from_form(form);
        let source_name = &source.value.name;
        let token_name = &token.value.name;

        if let Err(violation) = self.modes.require(ModeRequirement::OutsideWhenGuard) {
            self.report(
                ErrorKind::mode_required(format!("{} '{}'", form, source_name), violation),
                token.span,
            );
        }

        let source_symbol = match self.symbols.lookup(source_name) {
            Ok(symbol) if symbol.is_variable() => Some(symbol.clone()),
            Ok(_) => {
                self.report(
                    ErrorKind::InvalidOperation(format!(
                        "cannot apply '{}' to '{}': it is not a variable",
                        form, source_name
                    )),
                    source.span,
                );
                None
            }
            Err(err) => {
                self.report(err.into(), source.span);
                None
            }
        };

        let Some(source_symbol) = source_symbol else {
            self.declare_token(token, kind, Type::Unknown);
            return None;
        };

        if source_symbol.is_moved() {
            self.report(ErrorKind::UseAfterMove(source_name.clone()), source.span);
        }

        // Re-borrowing through a token cannot gain write access
        if let Some(held) = source_symbol.token_kind() {
            if kind.allows_write() && !held.allows_write() {
                self.report(
                    ErrorKind::ReadOnlyToken {
                        token: source_name.clone(),
                        kind: held,
                    },
                    source.span,
                );
            }
        }

        let inner = source_symbol.ty.strip_token().clone();
        let depth = self.depth();
        let opened = match self
            .tracker
            .begin_access(source_symbol.key(), token_name, kind, depth, token.span)
        {
            Ok(key) => Some(key),
            Err(violation) => {
                self.report(violation.into(), source.span);
                None
            }
        };

        self.declare_token(token, kind, inner);
        opened
    }

    fn declare_token(&mut self, token: &Node<Ident>, kind: AccessKind, inner: Type) {
        let symbol = Symbol::variable(token.value.name.clone(), Type::token(kind, inner), false, token.span);
        if let Err(err) = self.declare(symbol) {
            self.report_error(err);
        }
    }
}
