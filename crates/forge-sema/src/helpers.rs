//! Type rules shared by the checkers

use std::collections::HashMap;
use forge_ast::{BinaryOp, Literal, UnaryOp};

use crate::config::Language;
use crate::error::ErrorKind;
use crate::ownership::AccessKind;
use crate::types::{Primitive, Type};

/// Stateless type relations: literal typing, assignability, operators
pub struct TypeHelpers;

impl TypeHelpers {
    pub fn literal_type(lit: &Literal) -> Type {
        match lit {
            Literal::Integer { suffix: Some(suffix), .. }
            | Literal::Float { suffix: Some(suffix), .. } => {
                Type::Primitive(Primitive::from_suffix(*suffix))
            }
            Literal::Integer { suffix: None, .. } => Type::IntLiteral,
            Literal::Float { suffix: None, .. } => Type::FloatLiteral,
            Literal::Bool(_) => Type::bool(),
            Literal::Text(_) => Type::text(),
            Literal::Letter(_) => Type::Primitive(Primitive::Letter),
        }
    }

    /// Fix a flexible literal type to the language default when it becomes a binding's type
    pub fn default_literal(ty: Type, language: Language) -> Type {
        match ty {
            Type::IntLiteral => language.default_integer(),
            Type::FloatLiteral => language.default_fractional(),
            other => other,
        }
    }

    /// Whether a value of type `value` may be stored where `target` is expected
    pub fn is_assignable(target: &Type, value: &Type) -> bool {
        if target == value {
            return true;
        }

        match (target, value) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Param(_), _) | (_, Type::Param(_)) => true,
            // A read-only view parameter accepts any token over the same value
            (
                Type::Token { kind: target_kind, inner: target_inner },
                Type::Token { kind: value_kind, inner: value_inner },
            ) => {
                (target_kind == value_kind || *target_kind == AccessKind::ExclusiveView)
                    && Self::is_assignable(target_inner, value_inner)
            }
            // Passing a plain value to a token parameter borrows it for the call
            (Type::Token { inner, .. }, v) => Self::is_assignable(inner, v),
            (t, Type::Token { inner, .. }) => Self::is_assignable(t, inner),
            (t, Type::IntLiteral) => t.is_integer_like(),
            (t, Type::FloatLiteral) => t.is_fractional_like(),
            (
                Type::Named { name: target_name, args: target_args },
                Type::Named { name: value_name, args: value_args },
            ) => {
                target_name == value_name
                    && (target_args.is_empty()
                        || value_args.is_empty()
                        || (target_args.len() == value_args.len()
                            && target_args
                                .iter()
                                .zip(value_args)
                                .all(|(t, v)| Self::is_assignable(t, v))))
            }
            _ => false,
        }
    }

    pub fn check_assignable(target: &Type, value: &Type) -> Result<(), ErrorKind> {
        if Self::is_assignable(target, value) {
            Ok(())
        } else {
            Err(ErrorKind::TypeMismatch {
                expected: target.clone(),
                found: value.clone(),
            })
        }
    }

    /// Common type of two numeric operands, if they agree without conversion
    pub fn unify_numeric(left: &Type, right: &Type) -> Option<Type> {
        match (left, right) {
            (l, r) if l == r => Some(l.clone()),
            (Type::IntLiteral, other) | (other, Type::IntLiteral) if other.is_integer_like() => {
                Some(other.clone())
            }
            (Type::FloatLiteral, other) | (other, Type::FloatLiteral)
                if other.is_fractional_like() =>
            {
                Some(other.clone())
            }
            _ => None,
        }
    }

    /// Result type of `left op right`
    pub fn check_binary(left: &Type, op: BinaryOp, right: &Type) -> Result<Type, ErrorKind> {
        let (left, right) = (left.strip_token(), right.strip_token());

        if left.is_unknown() || right.is_unknown() {
            return Ok(if op.is_comparison() || op.is_logical() {
                Type::bool()
            } else {
                Type::Unknown
            });
        }

        if op.is_logical() {
            let offending = if !left.is_bool() { left } else { right };
            return if left.is_bool() && right.is_bool() {
                Ok(Type::bool())
            } else {
                Err(ErrorKind::TypeMismatch {
                    expected: Type::bool(),
                    found: offending.clone(),
                })
            };
        }

        if op.is_comparison() {
            if left.is_numeric() && right.is_numeric() {
                return Self::unify_or_mixed(left, op, right).map(|_| Type::bool());
            }
            let ordered = matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
                || left.is_text()
                || matches!(left, Type::Primitive(Primitive::Letter | Primitive::Byte));
            if ordered && Self::is_assignable(left, right) && Self::is_assignable(right, left) {
                return Ok(Type::bool());
            }
            return Err(Self::operand_mismatch(left, op, right));
        }

        if op.is_bitwise() {
            if left.is_integer_like() && right.is_integer_like() {
                return Self::unify_or_mixed(left, op, right);
            }
            let offending = if left.is_integer_like() { right } else { left };
            return Err(ErrorKind::TypeMismatch {
                expected: Type::Primitive(Primitive::U64),
                found: offending.clone(),
            });
        }

        if op == BinaryOp::Add && left.is_text() && right.is_text() {
            return Ok(Type::text());
        }
        if left.is_numeric() && right.is_numeric() {
            return Self::unify_or_mixed(left, op, right);
        }
        Err(Self::operand_mismatch(left, op, right))
    }

    fn unify_or_mixed(left: &Type, op: BinaryOp, right: &Type) -> Result<Type, ErrorKind> {
        Self::unify_numeric(left, right).ok_or_else(|| ErrorKind::MixedTypeArithmetic {
            op,
            left: left.clone(),
            right: right.clone(),
        })
    }

    fn operand_mismatch(left: &Type, op: BinaryOp, right: &Type) -> ErrorKind {
        if left.is_numeric() || right.is_numeric() {
            let (expected, found) = if left.is_numeric() { (left, right) } else { (right, left) };
            ErrorKind::TypeMismatch {
                expected: expected.clone(),
                found: found.clone(),
            }
        } else {
            ErrorKind::InvalidOperation(format!("'{}' is not defined for {} and {}", op, left, right))
        }
    }

    pub fn check_unary(op: UnaryOp, operand: &Type) -> Result<Type, ErrorKind> {
        let operand = operand.strip_token();
        if operand.is_unknown() {
            return Ok(Type::Unknown);
        }
        let ok = match op {
            UnaryOp::Neg => operand.is_numeric(),
            UnaryOp::Not => operand.is_bool(),
            UnaryOp::BitNot => operand.is_integer_like(),
        };
        if ok {
            Ok(operand.clone())
        } else {
            Err(ErrorKind::InvalidOperation(format!(
                "'{}' cannot be applied to {}",
                op, operand
            )))
        }
    }

    /// Explicit `expr as T` conversions
    pub fn check_conversion(from: &Type, to: &Type) -> Result<(), ErrorKind> {
        let from = from.strip_token();
        let allowed = from.is_unknown()
            || to.is_unknown()
            || (from.is_numeric() && to.is_numeric())
            || Self::is_assignable(to, from)
            || matches!(
                (from, to),
                (Type::Primitive(Primitive::Letter | Primitive::Byte), t) if t.is_integer_like()
            )
            || matches!(
                (from, to),
                (f, Type::Primitive(Primitive::Letter | Primitive::Byte)) if f.is_integer_like()
            );
        if allowed {
            Ok(())
        } else {
            Err(ErrorKind::InvalidOperation(format!("cannot convert {} to {}", from, to)))
        }
    }

    /// Element type produced by iterating over `ty`
    pub fn element_type(ty: &Type) -> Option<Type> {
        match ty.strip_token() {
            Type::Unknown => Some(Type::Unknown),
            t if t.is_text() => Some(Type::Primitive(Primitive::Letter)),
            Type::Named { args, .. } => args.first().cloned(),
            _ => None,
        }
    }

    /// Replace generic parameters with their bound arguments
    pub fn substitute(ty: &Type, bindings: &HashMap<String, Type>) -> Type {
        match ty {
            Type::Param(name) => bindings.get(name).cloned().unwrap_or(Type::Unknown),
            Type::Named { name, args } => Type::Named {
                name: name.clone(),
                args: args.iter().map(|arg| Self::substitute(arg, bindings)).collect(),
            },
            Type::Token { kind, inner } => Type::token(*kind, Self::substitute(inner, bindings)),
            Type::Routine { params, ret } => Type::Routine {
                params: params.iter().map(|p| Self::substitute(p, bindings)).collect(),
                ret: Box::new(Self::substitute(ret, bindings)),
            },
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_ast::NumericSuffix;

    fn prim(p: Primitive) -> Type {
        Type::Primitive(p)
    }

    #[test]
    fn test_literal_types() {
        let unsuffixed = Literal::Integer { value: 3, suffix: None };
        assert_eq!(TypeHelpers::literal_type(&unsuffixed), Type::IntLiteral);

        let suffixed = Literal::Float { value: 1.5, suffix: Some(NumericSuffix::D32) };
        assert_eq!(TypeHelpers::literal_type(&suffixed), prim(Primitive::D32));

        assert_eq!(
            TypeHelpers::default_literal(Type::IntLiteral, Language::RazorForge),
            prim(Primitive::S64)
        );
        assert_eq!(
            TypeHelpers::default_literal(Type::FloatLiteral, Language::Suflae),
            Type::named("Decimal")
        );
    }

    #[test]
    fn test_same_type_arithmetic() {
        for p in Primitive::ALL.iter().filter(|p| p.is_numeric()) {
            assert_eq!(
                TypeHelpers::check_binary(&prim(*p), BinaryOp::Mul, &prim(*p)),
                Ok(prim(*p))
            );
        }
    }

    #[test]
    fn test_mixed_arithmetic_rejected() {
        let err = TypeHelpers::check_binary(&prim(Primitive::S32), BinaryOp::Add, &prim(Primitive::S64));
        assert!(matches!(err, Err(ErrorKind::MixedTypeArithmetic { .. })));

        let err = TypeHelpers::check_binary(&Type::IntLiteral, BinaryOp::Add, &Type::FloatLiteral);
        assert!(matches!(err, Err(ErrorKind::MixedTypeArithmetic { .. })));

        let err = TypeHelpers::check_binary(&prim(Primitive::F32), BinaryOp::Lt, &prim(Primitive::D32));
        assert!(matches!(err, Err(ErrorKind::MixedTypeArithmetic { .. })));
    }

    #[test]
    fn test_literal_unification() {
        assert_eq!(
            TypeHelpers::check_binary(&prim(Primitive::U8), BinaryOp::Add, &Type::IntLiteral),
            Ok(prim(Primitive::U8))
        );
        assert_eq!(
            TypeHelpers::check_binary(&Type::FloatLiteral, BinaryOp::Sub, &Type::named("Decimal")),
            Ok(Type::named("Decimal"))
        );
        assert!(TypeHelpers::check_binary(&prim(Primitive::F64), BinaryOp::Add, &Type::IntLiteral).is_err());
    }

    #[test]
    fn test_text_and_logic() {
        assert_eq!(
            TypeHelpers::check_binary(&Type::text(), BinaryOp::Add, &Type::text()),
            Ok(Type::text())
        );
        assert_eq!(
            TypeHelpers::check_binary(&Type::bool(), BinaryOp::And, &Type::bool()),
            Ok(Type::bool())
        );
        assert!(matches!(
            TypeHelpers::check_binary(&Type::bool(), BinaryOp::Or, &prim(Primitive::S32)),
            Err(ErrorKind::TypeMismatch { .. })
        ));
        assert!(TypeHelpers::check_binary(&prim(Primitive::F32), BinaryOp::BitAnd, &prim(Primitive::F32)).is_err());
    }

    #[test]
    fn test_unknown_absorbs() {
        assert_eq!(
            TypeHelpers::check_binary(&Type::Unknown, BinaryOp::Add, &prim(Primitive::S8)),
            Ok(Type::Unknown)
        );
        assert_eq!(
            TypeHelpers::check_binary(&Type::Unknown, BinaryOp::Eq, &Type::text()),
            Ok(Type::bool())
        );
    }

    #[test]
    fn test_token_assignability() {
        let point = Type::named("Point");
        let viewed = Type::token(AccessKind::ExclusiveView, point.clone());
        let hijacked = Type::token(AccessKind::ExclusiveTransfer, point.clone());

        assert!(TypeHelpers::is_assignable(&viewed, &point));
        assert!(TypeHelpers::is_assignable(&point, &viewed));
        assert!(TypeHelpers::is_assignable(&viewed, &hijacked));
        assert!(!TypeHelpers::is_assignable(&hijacked, &viewed));
        assert!(!TypeHelpers::is_assignable(&viewed, &Type::text()));
    }

    #[test]
    fn test_generic_assignability() {
        let list_s32 = Type::Named { name: "List".into(), args: vec![prim(Primitive::S32)] };
        let list_u8 = Type::Named { name: "List".into(), args: vec![prim(Primitive::U8)] };
        assert!(!TypeHelpers::is_assignable(&list_s32, &list_u8));
        assert!(TypeHelpers::is_assignable(&list_s32, &Type::named("List")));
        assert!(!TypeHelpers::is_assignable(&prim(Primitive::U8), &Type::FloatLiteral));
    }

    #[test]
    fn test_conversion() {
        assert!(TypeHelpers::check_conversion(&prim(Primitive::S32), &prim(Primitive::F64)).is_ok());
        assert!(TypeHelpers::check_conversion(&prim(Primitive::Letter), &prim(Primitive::U32)).is_ok());
        assert!(TypeHelpers::check_conversion(&Type::text(), &prim(Primitive::S32)).is_err());
    }

    #[test]
    fn test_substitute_and_elements() {
        let mut bindings = HashMap::new();
        bindings.insert("T".to_string(), prim(Primitive::S16));
        let field = Type::Named { name: "List".into(), args: vec![Type::Param("T".into())] };
        let resolved = TypeHelpers::substitute(&field, &bindings);
        assert_eq!(TypeHelpers::element_type(&resolved), Some(prim(Primitive::S16)));
        assert_eq!(TypeHelpers::element_type(&Type::text()), Some(prim(Primitive::Letter)));
        assert_eq!(TypeHelpers::element_type(&Type::bool()), None);
    }
}
