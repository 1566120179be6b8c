//! Expression checking methods

use std::collections::HashMap;
use forge_ast::{Expr, FieldInit, Ident, Node, RawOp, Span, TypeExpr};

use crate::analyzer::SemanticAnalyzer;
use crate::error::{ErrorKind, SemanticError};
use crate::helpers::TypeHelpers;
use crate::modes::{Mode, ModeRequirement};
use crate::ownership::{OwnershipTracker, UseKind};
use crate::symbols::{BindingState, Semantics, Symbol, SymbolKind};
use crate::types::{Primitive, Type};

impl SemanticAnalyzer<'_> {
    pub(crate) fn check_expr(&mut self, expr: &Node<Expr>) -> Result<Type, SemanticError> {
        self.check_expr_use(expr, UseKind::Read)
    }

    /// Type of `expr`, reporting any error and yielding `Unknown` in its place
    pub(crate) fn expr_type(&mut self, expr: &Node<Expr>, use_kind: UseKind) -> Type {
        self.accepted_expr_type(expr, use_kind).unwrap_or(Type::Unknown)
    }

    /// Type of `expr` when the use was accepted; `None` once an error is reported.
    /// A rejected use must not move its binding.
    pub(crate) fn accepted_expr_type(&mut self, expr: &Node<Expr>, use_kind: UseKind) -> Option<Type> {
        match self.check_expr_use(expr, use_kind) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.report_error(err);
                None
            }
        }
    }

    /// Check `expr` where its value flows into `use_kind`.
    /// Only a bare identifier carries the use to a binding; compound
    /// expressions read their operands.
    pub(crate) fn check_expr_use(&mut self, expr: &Node<Expr>, use_kind: UseKind) -> Result<Type, SemanticError> {
        let span = expr.span;
        match &expr.value {
            Expr::Literal(lit) => Ok(TypeHelpers::literal_type(lit)),
            Expr::Ident(ident) => self.check_ident(ident, use_kind, span),
            Expr::Paren(inner) => self.check_expr_use(inner, use_kind),
            Expr::Binary { left, op, right } => {
                let left_ty = self.check_expr(left)?;
                let right_ty = self.check_expr(right)?;
                TypeHelpers::check_binary(&left_ty, *op, &right_ty)
                    .map_err(|kind| SemanticError::new(kind, span))
            }
            Expr::Unary { op, expr: operand } => {
                let operand_ty = self.check_expr(operand)?;
                TypeHelpers::check_unary(*op, &operand_ty).map_err(|kind| SemanticError::new(kind, span))
            }
            Expr::Call { callee, args } => self.check_call(callee, args, span),
            Expr::Member { object, property } => self.check_member(object, property),
            Expr::Index { object, index } => {
                let object_ty = self.check_expr(object)?;
                self.index_type(&object_ty, index, span)
            }
            Expr::Construct { type_name, fields } => self.check_construct(type_name, fields, span),
            Expr::Convert { expr: inner, target } => {
                let from = self.check_expr(inner)?;
                let to = self.resolve_type(target)?;
                TypeHelpers::check_conversion(&from, &to).map_err(|kind| SemanticError::new(kind, span))?;
                Ok(to)
            }
            Expr::Raw { op, type_arg, args } => self.check_raw(*op, type_arg.as_ref(), args, span),
            Expr::ScopedAccess {
                form,
                source,
                token,
                body,
            } => {
                // The body's value leaves the construct, so it is stored one level out
                let target_depth = self.depth();
                self.with_access(*form, source, token, span, |this| {
                    this.check_expr_use(body, UseKind::Store { target_depth })
                })
            }
        }
    }

    fn check_ident(&mut self, ident: &Ident, use_kind: UseKind, span: Span) -> Result<Type, SemanticError> {
        let symbol = self
            .symbols
            .lookup(&ident.name)
            .map_err(|err| SemanticError::new(err.into(), span))?
            .clone();

        match &symbol.kind {
            SymbolKind::Variable { .. } => {
                self.check_binding_use(&symbol, use_kind, span)?;
                Ok(symbol.ty)
            }
            SymbolKind::Function { .. } => Ok(symbol.ty),
            SymbolKind::Type { .. } | SymbolKind::Struct { .. } => Err(SemanticError::new(
                ErrorKind::InvalidOperation(format!("type '{}' cannot be used as a value", ident.name)),
                span,
            )),
            SymbolKind::ModuleAlias { module } => Err(SemanticError::new(
                ErrorKind::InvalidOperation(format!("module '{}' cannot be used as a value", module)),
                span,
            )),
        }
    }

    /// Move state, token invalidation and token escape rules for one use of a variable
    pub(crate) fn check_binding_use(&self, symbol: &Symbol, use_kind: UseKind, span: Span) -> Result<(), SemanticError> {
        if symbol.is_moved() {
            return Err(SemanticError::new(ErrorKind::UseAfterMove(symbol.name.clone()), span));
        }

        let key = symbol.key();
        let depth = self.depth();
        let in_usurping = self.modes.is_active(Mode::Usurping);
        self.tracker
            .check_use(&key, depth, use_kind, in_usurping)
            .map_err(|violation| SemanticError::new(violation.into(), span))?;

        // Token-typed bindings the tracker does not own (parameters, copies) follow the same rules
        if self.tracker.token(&key).is_none() {
            if let Some(kind) = symbol.token_kind() {
                OwnershipTracker::check_token_use(&symbol.name, kind, symbol.depth, depth, use_kind, in_usurping)
                    .map_err(|violation| SemanticError::new(violation.into(), span))?;
            }
        }
        Ok(())
    }

    fn check_call(&mut self, callee: &Node<Expr>, args: &[Node<Expr>], span: Span) -> Result<Type, SemanticError> {
        let name = Self::callee_name(&callee.value);

        if let Some(ident) = callee.value.as_ident() {
            if self.symbols.lookup(&ident.name).is_ok_and(|s| s.is_type()) {
                return Err(SemanticError::new(ErrorKind::NotCallable(name), callee.span));
            }
        }

        let callee_ty = self.check_expr(callee)?;
        let (params, ret) = match callee_ty.strip_token() {
            Type::Routine { params, ret } => (params.clone(), (**ret).clone()),
            Type::Unknown => {
                for arg in args {
                    self.expr_type(arg, UseKind::Argument { transient: false });
                }
                return Ok(Type::Unknown);
            }
            _ => return Err(SemanticError::new(ErrorKind::NotCallable(name), callee.span)),
        };

        if params.len() != args.len() {
            self.report(
                ErrorKind::ArityMismatch {
                    name,
                    expected: params.len(),
                    found: args.len(),
                },
                span,
            );
        }

        for (i, arg) in args.iter().enumerate() {
            let Some(param) = params.get(i) else {
                self.expr_type(arg, UseKind::Read);
                continue;
            };
            let transient = param.token_kind().is_some();
            let Some(arg_ty) = self.accepted_expr_type(arg, UseKind::Argument { transient }) else {
                continue;
            };
            if let Err(kind) = TypeHelpers::check_assignable(param, &arg_ty) {
                self.report(kind, arg.span);
                continue;
            }
            if transient {
                self.check_auto_borrow(param, arg);
            } else {
                self.apply_move(arg);
            }
        }
        Ok(ret)
    }

    /// A plain binding lent to a writable token parameter must itself be writable
    fn check_auto_borrow(&mut self, param: &Type, arg: &Node<Expr>) {
        let writable = param.token_kind().is_some_and(|kind| kind.allows_write());
        let Some(ident) = arg.value.as_ident() else {
            return;
        };
        let Ok(symbol) = self.symbols.lookup(&ident.name) else {
            return;
        };
        if writable && symbol.is_variable() && symbol.token_kind().is_none() && !symbol.is_mutable() {
            self.report(ErrorKind::AssignToImmutable(ident.name.clone()), arg.span);
        }
    }

    fn callee_name(callee: &Expr) -> String {
        match callee {
            Expr::Ident(ident) => ident.name.clone(),
            Expr::Member { object, property } => {
                format!("{}.{}", Self::callee_name(&object.value), property.value.name)
            }
            Expr::Paren(inner) => Self::callee_name(&inner.value),
            _ => "expression".to_string(),
        }
    }

    fn check_member(&mut self, object: &Node<Expr>, property: &Node<Ident>) -> Result<Type, SemanticError> {
        if let Some(ident) = object.value.as_ident() {
            let module = match self.symbols.lookup(&ident.name) {
                Ok(Symbol {
                    kind: SymbolKind::ModuleAlias { module },
                    ..
                }) => Some(module.clone()),
                _ => None,
            };
            if let Some(module) = module {
                let member = self.module_member(&module, property)?;
                return match member.kind {
                    SymbolKind::Function { .. } | SymbolKind::Variable { .. } => Ok(member.ty),
                    _ => Err(SemanticError::new(
                        ErrorKind::InvalidOperation(format!(
                            "type '{}.{}' cannot be used as a value",
                            ident.name, property.value.name
                        )),
                        property.span,
                    )),
                };
            }
        }

        let object_ty = self.check_expr(object)?;
        self.member_type(&object_ty, property)
    }

    /// Type of field `property` on `object_ty`, reading through tokens
    pub(crate) fn member_type(&self, object_ty: &Type, property: &Node<Ident>) -> Result<Type, SemanticError> {
        let base = object_ty.strip_token();
        let unknown_member = || {
            SemanticError::new(
                ErrorKind::UnknownMember {
                    ty: base.clone(),
                    member: property.value.name.clone(),
                },
                property.span,
            )
        };

        match base {
            Type::Unknown => Ok(Type::Unknown),
            Type::Named { name, args } => {
                let symbol = self.symbols.lookup(name).map_err(|_| unknown_member())?;
                let field_ty = symbol
                    .fields()
                    .and_then(|fields| fields.iter().find(|(field, _)| *field == property.value.name))
                    .map(|(_, ty)| ty.clone())
                    .ok_or_else(unknown_member)?;
                let bindings: HashMap<String, Type> = symbol
                    .type_params()
                    .iter()
                    .cloned()
                    .zip(args.iter().cloned())
                    .collect();
                Ok(TypeHelpers::substitute(&field_ty, &bindings))
            }
            _ => Err(unknown_member()),
        }
    }

    pub(crate) fn index_type(&mut self, object_ty: &Type, index: &Node<Expr>, span: Span) -> Result<Type, SemanticError> {
        let index_ty = self.check_expr(index)?;
        let index_ty = index_ty.strip_token();
        if !index_ty.is_integer_like() && !index_ty.is_unknown() {
            return Err(SemanticError::new(
                ErrorKind::TypeMismatch {
                    expected: Type::Primitive(Primitive::Uaddr),
                    found: index_ty.clone(),
                },
                index.span,
            ));
        }
        TypeHelpers::element_type(object_ty).ok_or_else(|| {
            SemanticError::new(
                ErrorKind::InvalidOperation(format!("cannot index into {}", object_ty)),
                span,
            )
        })
    }

    fn check_construct(&mut self, type_name: &Node<Ident>, inits: &[FieldInit], span: Span) -> Result<Type, SemanticError> {
        let name = &type_name.value.name;
        let symbol = self
            .symbols
            .lookup(name)
            .map_err(|err| SemanticError::new(err.into(), type_name.span))?;
        let Some(fields) = symbol.fields().map(|fields| fields.to_vec()) else {
            return Err(SemanticError::new(ErrorKind::NotCallable(name.clone()), type_name.span));
        };
        let ty = symbol.ty.clone();

        let mut seen: Vec<&str> = Vec::with_capacity(inits.len());
        for init in inits {
            let field_name = init.name.value.name.as_str();
            // Field values are owned by the new value, so tokens may not be stored
            let value_ty = self.accepted_expr_type(&init.value, UseKind::Argument { transient: false });

            if seen.contains(&field_name) {
                self.report(ErrorKind::DuplicateDeclaration(field_name.to_string()), init.name.span);
                continue;
            }
            seen.push(field_name);

            match fields.iter().find(|(field, _)| field == field_name) {
                Some((_, field_ty)) => {
                    let Some(value_ty) = value_ty else {
                        continue;
                    };
                    if let Err(kind) = TypeHelpers::check_assignable(field_ty, &value_ty) {
                        self.report(kind, init.value.span);
                    } else {
                        self.apply_move(&init.value);
                    }
                }
                None => self.report(
                    ErrorKind::UnknownMember {
                        ty: ty.clone(),
                        member: field_name.to_string(),
                    },
                    init.name.span,
                ),
            }
        }

        for (field, _) in &fields {
            if !seen.contains(&field.as_str()) {
                self.report(
                    ErrorKind::InvalidOperation(format!("missing field '{}' in construction of {}", field, name)),
                    span,
                );
            }
        }
        Ok(ty)
    }

    fn check_raw(
        &mut self,
        op: RawOp,
        type_arg: Option<&Node<TypeExpr>>,
        args: &[Node<Expr>],
        span: Span,
    ) -> Result<Type, SemanticError> {
        if let Err(violation) = self.modes.require(ModeRequirement::DangerOrMayhem) {
            self.report(ErrorKind::mode_required(op.to_string(), violation), span);
        }

        let expected_args = match op {
            RawOp::AddressOf | RawOp::ReadAs => 1,
            RawOp::WriteAs => 2,
        };
        if args.len() != expected_args {
            return Err(SemanticError::new(
                ErrorKind::ArityMismatch {
                    name: op.to_string(),
                    expected: expected_args,
                    found: args.len(),
                },
                span,
            ));
        }

        let target = match (op, type_arg) {
            (RawOp::AddressOf, _) => None,
            (_, Some(ty)) => Some(self.resolve_type(ty)?),
            (_, None) => {
                return Err(SemanticError::new(
                    ErrorKind::InvalidOperation(format!("{} needs a type argument", op)),
                    span,
                ))
            }
        };

        match op {
            RawOp::AddressOf => {
                if args[0].value.as_ident().is_none() {
                    return Err(SemanticError::new(
                        ErrorKind::InvalidOperation("address_of! takes a variable".to_string()),
                        args[0].span,
                    ));
                }
                self.check_expr(&args[0])?;
                Ok(Type::Primitive(Primitive::Uaddr))
            }
            RawOp::ReadAs => {
                self.check_address(&args[0])?;
                Ok(target.unwrap_or(Type::Unknown))
            }
            RawOp::WriteAs => {
                self.check_address(&args[0])?;
                let value_ty = self.check_expr_use(&args[1], UseKind::Argument { transient: false })?;
                if let Some(target) = &target {
                    TypeHelpers::check_assignable(target, &value_ty)
                        .map_err(|kind| SemanticError::new(kind, args[1].span))?;
                }
                Ok(Type::Blank)
            }
        }
    }

    fn check_address(&mut self, address: &Node<Expr>) -> Result<(), SemanticError> {
        let ty = self.check_expr(address)?;
        let ok = matches!(
            ty.strip_token(),
            Type::Primitive(Primitive::Uaddr | Primitive::Saddr) | Type::IntLiteral | Type::Unknown
        );
        if ok {
            Ok(())
        } else {
            Err(SemanticError::new(
                ErrorKind::TypeMismatch {
                    expected: Type::Primitive(Primitive::Uaddr),
                    found: ty,
                },
                address.span,
            ))
        }
    }

    /// Mark a bare reference-semantics binding moved after its value was transferred
    pub(crate) fn apply_move(&mut self, value: &Node<Expr>) {
        if !self.config.language.moves_on_assignment() {
            return;
        }
        let Some(ident) = value.value.as_ident() else {
            return;
        };
        let moves = match self.symbols.lookup(&ident.name) {
            Ok(symbol) => {
                symbol.is_variable() && symbol.token_kind().is_none() && self.has_reference_semantics(&symbol.ty)
            }
            Err(_) => false,
        };
        if moves {
            tracing::trace!(name = %ident.name, "moved");
            if let Err(err) = self.symbols.set_state(&ident.name, BindingState::Moved) {
                self.internal_error(err, value.span);
            }
        }
    }

    /// A scoped token over a reference-semantics value
    pub(crate) fn is_reference_token(&self, ty: &Type) -> bool {
        matches!(ty, Type::Token { inner, .. } if self.has_reference_semantics(inner))
    }

    pub(crate) fn has_reference_semantics(&self, ty: &Type) -> bool {
        match ty {
            Type::Named { name, .. } => self
                .symbols
                .lookup(name)
                .is_ok_and(|symbol| symbol.semantics() == Some(Semantics::Reference)),
            _ => false,
        }
    }
}
