//! Statement checking methods

use forge_ast::{Block, Expr, Node, Span, Stmt, WhenArm, WhenPattern};

use crate::analyzer::SemanticAnalyzer;
use crate::error::{ErrorKind, SemanticError};
use crate::helpers::TypeHelpers;
use crate::modes::Mode;
use crate::ownership::UseKind;
use crate::symbols::{BindingState, Symbol, SymbolKind};
use crate::types::Type;

impl SemanticAnalyzer<'_> {
    /// Check each statement of `block` in the current scope.
    /// An error aborts only the statement that raised it.
    pub(crate) fn check_block_stmts(&mut self, block: &Block) {
        for stmt in &block.stmts {
            if self.is_aborted() {
                return;
            }
            if let Err(err) = self.check_stmt(stmt) {
                self.report_error(err);
            }
        }
    }

    pub(crate) fn check_block(&mut self, block: &Block) {
        self.with_scope(|this| this.check_block_stmts(block));
    }

    pub(crate) fn check_stmt(&mut self, stmt: &Node<Stmt>) -> Result<(), SemanticError> {
        match &stmt.value {
            Stmt::Expr(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }
            Stmt::VarDecl(var_decl) => self.check_var_decl(var_decl),
            Stmt::Assign { target, value } => self.check_assign(target, value),
            Stmt::Return(value) => self.check_return(value.as_ref(), stmt.span),
            Stmt::If {
                condition,
                then_block,
                else_branch,
            } => {
                if let Err(err) = self.check_condition(condition) {
                    self.report_error(err);
                }
                self.check_block(&then_block.value);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                if let Err(err) = self.check_condition(condition) {
                    self.report_error(err);
                }
                self.in_loop(|this| this.check_block(&body.value));
                Ok(())
            }
            Stmt::For {
                binding,
                iterable,
                body,
            } => {
                let iterable_ty = self.check_expr(iterable)?;
                let element = TypeHelpers::element_type(&iterable_ty).ok_or_else(|| {
                    SemanticError::new(
                        ErrorKind::InvalidOperation(format!("cannot iterate over {}", iterable_ty)),
                        iterable.span,
                    )
                })?;
                self.with_scope(|this| {
                    let symbol = Symbol::variable(binding.value.name.clone(), element, false, binding.span);
                    if let Err(err) = this.declare(symbol) {
                        this.report_error(err);
                    }
                    this.in_loop(|this| this.check_block_stmts(&body.value));
                });
                Ok(())
            }
            Stmt::When { subject, arms } => {
                let subject_ty = self.check_expr(subject)?;
                for arm in arms {
                    self.with_scope(|this| this.check_when_arm(arm, &subject_ty));
                }
                Ok(())
            }
            Stmt::Block(block) => {
                self.check_block(block);
                Ok(())
            }
            Stmt::Danger(block) => {
                self.check_unsafe_block(Mode::Danger, &block.value, stmt.span);
                Ok(())
            }
            Stmt::Mayhem(block) => {
                self.check_unsafe_block(Mode::Mayhem, &block.value, stmt.span);
                Ok(())
            }
            Stmt::ScopedAccess(access) => {
                self.with_access(access.form, &access.source, &access.token, stmt.span, |this| {
                    this.check_block_stmts(&access.body.value)
                });
                Ok(())
            }
            Stmt::Break | Stmt::Continue => {
                if self.loop_depth == 0 {
                    let keyword = if matches!(stmt.value, Stmt::Break) { "break" } else { "continue" };
                    return Err(SemanticError::new(
                        ErrorKind::InvalidOperation(format!("'{}' outside of a loop", keyword)),
                        stmt.span,
                    ));
                }
                Ok(())
            }
            Stmt::Throw(expr) => {
                self.check_expr_use(expr, UseKind::Argument { transient: false })?;
                Ok(())
            }
        }
    }

    fn in_loop(&mut self, f: impl FnOnce(&mut Self)) {
        self.loop_depth += 1;
        f(self);
        self.loop_depth -= 1;
    }

    fn check_unsafe_block(&mut self, mode: Mode, block: &Block, span: Span) {
        let language = self.config.language;
        if !language.supports_unsafe_blocks() {
            let construct = if mode == Mode::Danger { "danger! block" } else { "mayhem! block" };
            self.report(
                ErrorKind::UnsupportedConstruct {
                    construct: construct.to_string(),
                    language,
                },
                span,
            );
        }
        self.with_mode(mode, |this| this.check_block(block));
    }

    fn check_when_arm(&mut self, arm: &WhenArm, subject_ty: &Type) {
        match &arm.pattern.value {
            WhenPattern::Else => {}
            WhenPattern::Literal(lit) => {
                let lit_ty = TypeHelpers::literal_type(lit);
                if let Err(kind) = TypeHelpers::check_assignable(subject_ty.strip_token(), &lit_ty) {
                    self.report(kind, arm.pattern.span);
                }
            }
            WhenPattern::Binding(name) => {
                let symbol = Symbol::variable(name.value.name.clone(), subject_ty.clone(), false, name.span);
                if let Err(err) = self.declare(symbol) {
                    self.report_error(err);
                }
            }
        }

        if let Some(guard) = &arm.guard {
            if let Err(err) = self.with_mode(Mode::WhenGuard, |this| this.check_condition(guard)) {
                self.report_error(err);
            }
        }
        self.check_block_stmts(&arm.body.value);
    }

    fn check_condition(&mut self, condition: &Node<Expr>) -> Result<(), SemanticError> {
        let ty = self.check_expr(condition)?;
        TypeHelpers::check_assignable(&Type::bool(), &ty)
            .map_err(|kind| SemanticError::new(kind, condition.span))
    }

    fn check_return(&mut self, value: Option<&Node<Expr>>, span: Span) -> Result<(), SemanticError> {
        let Some(expected) = self.current_return_type.clone() else {
            return Err(SemanticError::new(
                ErrorKind::InvalidOperation("'return' outside of a routine".to_string()),
                span,
            ));
        };

        match value {
            Some(value) => {
                let found = self.check_expr_use(value, UseKind::Return)?;
                TypeHelpers::check_assignable(&expected, &found)
                    .map_err(|kind| SemanticError::new(kind, value.span))
            }
            None if matches!(expected, Type::Blank | Type::Unknown) => Ok(()),
            None => Err(SemanticError::new(
                ErrorKind::TypeMismatch {
                    expected,
                    found: Type::Blank,
                },
                span,
            )),
        }
    }

    fn check_assign(&mut self, target: &Node<Expr>, value: &Node<Expr>) -> Result<(), SemanticError> {
        let (target_ty, target_depth) = match &target.value {
            Expr::Ident(ident) => {
                let symbol = self
                    .symbols
                    .lookup(&ident.name)
                    .map_err(|err| SemanticError::new(err.into(), target.span))?
                    .clone();
                match symbol.kind {
                    SymbolKind::Variable { mutable: true, .. } => {}
                    SymbolKind::Variable { .. } => {
                        return Err(SemanticError::new(
                            ErrorKind::AssignToImmutable(ident.name.clone()),
                            target.span,
                        ));
                    }
                    _ => {
                        return Err(SemanticError::new(
                            ErrorKind::InvalidOperation(format!("cannot assign to '{}'", ident.name)),
                            target.span,
                        ));
                    }
                }
                // A source held by a live token cannot be reassigned
                let in_usurping = self.modes.is_active(Mode::Usurping);
                self.tracker
                    .check_use(&symbol.key(), self.depth(), UseKind::Write, in_usurping)
                    .map_err(|violation| SemanticError::new(violation.into(), target.span))?;
                (symbol.ty, symbol.depth)
            }
            _ => self.check_place(target)?,
        };

        let value_ty = self.check_expr_use(value, UseKind::Store { target_depth })?;
        TypeHelpers::check_assignable(&target_ty, &value_ty)
            .map_err(|kind| SemanticError::new(kind, value.span))?;
        // A plain binding cannot take over a token's reference value
        if target_ty.token_kind().is_none() && self.is_reference_token(&value_ty) {
            return Err(SemanticError::new(
                ErrorKind::TypeMismatch {
                    expected: target_ty,
                    found: value_ty,
                },
                value.span,
            ));
        }
        self.apply_move(value);

        if let Some(ident) = target.value.as_ident() {
            if self.symbols.lookup(&ident.name).is_ok_and(|s| s.is_moved()) {
                tracing::trace!(name = %ident.name, "binding revived by assignment");
                if let Err(err) = self.symbols.set_state(&ident.name, BindingState::Live) {
                    self.internal_error(err, target.span);
                }
            }
        }
        Ok(())
    }

    /// Type of a field or element write target, plus the depth of its root binding
    fn check_place(&mut self, place: &Node<Expr>) -> Result<(Type, usize), SemanticError> {
        match &place.value {
            Expr::Paren(inner) => self.check_place(inner),
            Expr::Ident(ident) => {
                let symbol = self
                    .symbols
                    .lookup(&ident.name)
                    .map_err(|err| SemanticError::new(err.into(), place.span))?
                    .clone();
                if !symbol.is_variable() {
                    return Err(SemanticError::new(
                        ErrorKind::InvalidOperation(format!("cannot assign through '{}'", ident.name)),
                        place.span,
                    ));
                }
                self.check_binding_use(&symbol, UseKind::Write, place.span)?;
                if symbol.token_kind().is_none() && !symbol.is_mutable() {
                    return Err(SemanticError::new(
                        ErrorKind::AssignToImmutable(ident.name.clone()),
                        place.span,
                    ));
                }
                Ok((symbol.ty, symbol.depth))
            }
            Expr::Member { object, property } => {
                let (object_ty, depth) = self.check_place(object)?;
                Ok((self.member_type(&object_ty, property)?, depth))
            }
            Expr::Index { object, index } => {
                let (object_ty, depth) = self.check_place(object)?;
                Ok((self.index_type(&object_ty, index, place.span)?, depth))
            }
            _ => Err(SemanticError::new(
                ErrorKind::InvalidOperation("invalid assignment target".to_string()),
                place.span,
            )),
        }
    }
}
