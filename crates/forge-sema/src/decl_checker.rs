//! Declaration checking methods

use forge_ast::{Decl, Expr, Node, RoutineDecl, Span, TypeDecl, TypeExpr, VarDecl, VarDeclKind};

use crate::analyzer::SemanticAnalyzer;
use crate::config::Language;
use crate::error::{ErrorKind, SemanticError};
use crate::helpers::TypeHelpers;
use crate::modes::Mode;
use crate::ownership::{AccessKind, UseKind};
use crate::symbols::{Symbol, SymbolKind};
use crate::types::{Primitive, Type};

impl SemanticAnalyzer<'_> {
    pub(crate) fn check_decl(&mut self, decl: &Node<Decl>) -> Result<(), SemanticError> {
        match &decl.value {
            Decl::Routine(routine) => self.check_routine(routine, decl.span),
            Decl::Record(type_decl) => self.check_type_decl(type_decl, false),
            Decl::Entity(type_decl) => self.check_type_decl(type_decl, true),
            Decl::Var(var_decl) => self.check_var_decl(var_decl),
        }
    }

    /// Declare the routine, then check its body in a scope holding its parameters.
    /// The routine is visible inside its own body, so recursion resolves.
    fn check_routine(&mut self, routine: &RoutineDecl, span: Span) -> Result<(), SemanticError> {
        let language = self.config.language;
        if routine.is_usurping && !language.supports_usurping() {
            self.report(
                ErrorKind::UnsupportedConstruct {
                    construct: "usurping routine".to_string(),
                    language,
                },
                span,
            );
        }

        let mut params = Vec::with_capacity(routine.params.len());
        for param in &routine.params {
            params.push(self.resolve_type_or_unknown(&param.type_annotation));
        }
        let ret = match &routine.return_type {
            Some(ty) => self.resolve_type_or_unknown(ty),
            None => Type::Blank,
        };

        let signature = Type::Routine {
            params: params.clone(),
            ret: Box::new(ret.clone()),
        };
        let name = &routine.name;
        self.declare(
            Symbol::function(name.value.name.clone(), signature, routine.is_usurping, name.span)
                .with_visibility(routine.visibility),
        )?;

        let Some(body) = &routine.body else {
            return Ok(());
        };

        let saved_return = self.current_return_type.replace(ret);
        let saved_loops = std::mem::take(&mut self.loop_depth);

        self.with_scope(|this| {
            for (param, ty) in routine.params.iter().zip(params) {
                let symbol = Symbol::variable(param.name.value.name.clone(), ty, false, param.name.span);
                if let Err(err) = this.declare(symbol) {
                    this.report_error(err);
                }
            }
            if routine.is_usurping {
                this.with_mode(Mode::Usurping, |this| this.check_block_stmts(&body.value));
            } else {
                this.check_block_stmts(&body.value);
            }
        });

        self.current_return_type = saved_return;
        self.loop_depth = saved_loops;
        Ok(())
    }

    fn check_type_decl(&mut self, decl: &TypeDecl, is_entity: bool) -> Result<(), SemanticError> {
        let name = decl.name.value.name.clone();
        let type_params: Vec<String> = decl.type_params.iter().map(|p| p.value.name.clone()).collect();

        // Declared before its fields so a field may refer to the type itself
        let symbol = if is_entity {
            Symbol::entity(name.clone(), Vec::new(), type_params, decl.name.span)
        } else {
            Symbol::record(name.clone(), Vec::new(), type_params, decl.name.span)
        };
        self.declare(symbol.with_visibility(decl.visibility))?;

        let fields = self.with_scope(|this| this.check_fields(decl));

        if let Ok(symbol) = self.symbols.lookup_mut(&name) {
            if let SymbolKind::Type { fields: slot, .. } | SymbolKind::Struct { fields: slot, .. } =
                &mut symbol.kind
            {
                *slot = fields;
            }
        }
        Ok(())
    }

    fn check_fields(&mut self, decl: &TypeDecl) -> Vec<(String, Type)> {
        for param in &decl.type_params {
            let name = param.value.name.clone();
            let symbol = Symbol::opaque_type(name.clone(), Type::Param(name), param.span);
            if let Err(err) = self.declare(symbol) {
                self.report_error(err);
            }
        }

        let mut fields: Vec<(String, Type)> = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let field_name = &field.name.value.name;
            if fields.iter().any(|(existing, _)| existing == field_name) {
                self.report(ErrorKind::DuplicateDeclaration(field_name.clone()), field.name.span);
                continue;
            }
            let ty = self.resolve_type_or_unknown(&field.type_annotation);
            if ty.token_kind().is_some() {
                self.report(
                    ErrorKind::InvalidOperation(format!(
                        "field '{}' cannot hold a scoped token",
                        field_name
                    )),
                    field.type_annotation.span,
                );
            }
            fields.push((field_name.clone(), ty));
        }
        fields
    }

    /// `let`/`var` declaration at module or block level
    pub(crate) fn check_var_decl(&mut self, var: &VarDecl) -> Result<(), SemanticError> {
        let name = &var.name.value.name;
        let declared = match &var.type_annotation {
            Some(ty) => Some(self.resolve_type_or_unknown(ty)),
            None => None,
        };

        let target_depth = self.depth();
        let value = var.init.as_ref().map(|init| {
            let ty = self.accepted_expr_type(init, UseKind::Store { target_depth });
            (init, ty)
        });

        let mut moves = false;
        let ty = match (declared, &value) {
            (Some(declared), Some((_, None))) => declared,
            (Some(declared), Some((init, Some(value_ty)))) => {
                if let Err(kind) = TypeHelpers::check_assignable(&declared, value_ty) {
                    self.report(kind, init.span);
                    declared
                } else if declared.token_kind().is_some()
                    && value_ty.token_kind().is_none()
                    && !value_ty.is_unknown()
                {
                    // A token binding must come from a scoped-access construct
                    self.report(
                        ErrorKind::TypeMismatch {
                            expected: declared.clone(),
                            found: value_ty.clone(),
                        },
                        init.span,
                    );
                    declared
                } else if declared.token_kind().is_none() && self.is_reference_token(value_ty) {
                    // Copying a token over a reference value keeps it a token
                    value_ty.clone()
                } else {
                    moves = true;
                    declared
                }
            }
            (Some(declared), None) => declared,
            (None, Some((_, value_ty))) => {
                moves = value_ty.is_some();
                TypeHelpers::default_literal(value_ty.clone().unwrap_or(Type::Unknown), self.config.language)
            }
            (None, None) => {
                self.report(ErrorKind::CannotInferType(name.clone()), var.name.span);
                Type::Unknown
            }
        };

        if let (true, Some((init, _))) = (moves, value) {
            self.apply_move(init);
        }

        let mutable = var.kind == VarDeclKind::Var;
        self.declare(Symbol::variable(name.clone(), ty, mutable, var.name.span).with_visibility(var.visibility))
    }

    /// Resolve a written type against the symbol table
    pub(crate) fn resolve_type(&mut self, ty: &Node<TypeExpr>) -> Result<Type, SemanticError> {
        let TypeExpr::Named { name, type_args } = &ty.value else {
            return Ok(Type::Blank);
        };

        let mut args = Vec::with_capacity(type_args.len());
        for arg in type_args {
            args.push(self.resolve_type(arg)?);
        }

        let type_name = &name.value.name;
        if let Some(kind) = AccessKind::from_token_type_name(type_name) {
            return match args.as_slice() {
                [inner] => Ok(Type::token(kind, inner.clone())),
                _ => Err(SemanticError::new(
                    ErrorKind::ArityMismatch {
                        name: type_name.clone(),
                        expected: 1,
                        found: args.len(),
                    },
                    ty.span,
                )),
            };
        }

        let symbol = self
            .symbols
            .lookup(type_name)
            .map_err(|err| SemanticError::new(err.into(), name.span))?;
        if !symbol.is_type() {
            return Err(SemanticError::new(
                ErrorKind::InvalidOperation(format!("'{}' is not a type", type_name)),
                name.span,
            ));
        }

        let expected = symbol.type_params().len();
        if args.is_empty() {
            Ok(symbol.ty.clone())
        } else if args.len() != expected {
            Err(SemanticError::new(
                ErrorKind::ArityMismatch {
                    name: type_name.clone(),
                    expected,
                    found: args.len(),
                },
                ty.span,
            ))
        } else {
            Ok(Type::Named {
                name: type_name.clone(),
                args,
            })
        }
    }

    pub(crate) fn resolve_type_or_unknown(&mut self, ty: &Node<TypeExpr>) -> Type {
        match self.resolve_type(ty) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.report_error(err);
                Type::Unknown
            }
        }
    }

    /// Signature-level symbol for a declaration of a loaded module.
    /// Types are taken as written; the module was checked on its own.
    pub(crate) fn module_symbol(decl: &Node<Decl>, language: Language) -> Symbol {
        let symbol = match &decl.value {
            Decl::Routine(routine) => {
                let params = routine
                    .params
                    .iter()
                    .map(|p| Self::written_type(&p.type_annotation.value, &[]))
                    .collect();
                let ret = routine
                    .return_type
                    .as_ref()
                    .map(|ty| Self::written_type(&ty.value, &[]))
                    .unwrap_or(Type::Blank);
                let signature = Type::Routine {
                    params,
                    ret: Box::new(ret),
                };
                Symbol::function(
                    routine.name.value.name.clone(),
                    signature,
                    routine.is_usurping,
                    routine.name.span,
                )
            }
            Decl::Record(type_decl) | Decl::Entity(type_decl) => {
                let type_params: Vec<String> =
                    type_decl.type_params.iter().map(|p| p.value.name.clone()).collect();
                let fields = type_decl
                    .fields
                    .iter()
                    .map(|field| {
                        let ty = Self::written_type(&field.type_annotation.value, &type_params);
                        (field.name.value.name.clone(), ty)
                    })
                    .collect();
                let name = type_decl.name.value.name.clone();
                if matches!(decl.value, Decl::Entity(_)) {
                    Symbol::entity(name, fields, type_params, type_decl.name.span)
                } else {
                    Symbol::record(name, fields, type_params, type_decl.name.span)
                }
            }
            Decl::Var(var) => {
                let ty = match (&var.type_annotation, &var.init) {
                    (Some(ty), _) => Self::written_type(&ty.value, &[]),
                    (None, Some(init)) => match &init.value {
                        Expr::Literal(lit) => {
                            TypeHelpers::default_literal(TypeHelpers::literal_type(lit), language)
                        }
                        _ => Type::Unknown,
                    },
                    (None, None) => Type::Unknown,
                };
                Symbol::variable(var.name.value.name.clone(), ty, var.kind == VarDeclKind::Var, var.name.span)
            }
        };
        symbol.with_visibility(decl.value.visibility())
    }

    /// Structural conversion of a written type, without lookups
    fn written_type(ty: &TypeExpr, type_params: &[String]) -> Type {
        let TypeExpr::Named { name, type_args } = ty else {
            return Type::Blank;
        };
        let name = &name.value.name;
        let args: Vec<Type> = type_args
            .iter()
            .map(|arg| Self::written_type(&arg.value, type_params))
            .collect();

        if let Some(kind) = AccessKind::from_token_type_name(name) {
            return match args.as_slice() {
                [inner] => Type::token(kind, inner.clone()),
                _ => Type::Unknown,
            };
        }
        if type_params.contains(name) {
            return Type::Param(name.clone());
        }
        if let Some(prim) = Primitive::from_name(name) {
            return Type::Primitive(prim);
        }
        if name == "Blank" {
            return Type::Blank;
        }
        Type::Named {
            name: name.clone(),
            args,
        }
    }
}
