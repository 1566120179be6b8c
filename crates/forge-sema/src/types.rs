//! Semantic type representation

use std::fmt;
use forge_ast::NumericSuffix;

use crate::ownership::AccessKind;

/// Built-in primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    S8,
    S16,
    S32,
    S64,
    S128,
    Saddr,
    U8,
    U16,
    U32,
    U64,
    U128,
    Uaddr,
    F16,
    F32,
    F64,
    F128,
    D32,
    D64,
    D128,
    Bool,
    Letter,
    Byte,
}

impl Primitive {
    pub const ALL: [Primitive; 22] = [
        Primitive::S8,
        Primitive::S16,
        Primitive::S32,
        Primitive::S64,
        Primitive::S128,
        Primitive::Saddr,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::U128,
        Primitive::Uaddr,
        Primitive::F16,
        Primitive::F32,
        Primitive::F64,
        Primitive::F128,
        Primitive::D32,
        Primitive::D64,
        Primitive::D128,
        Primitive::Bool,
        Primitive::Letter,
        Primitive::Byte,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::S8 => "s8",
            Primitive::S16 => "s16",
            Primitive::S32 => "s32",
            Primitive::S64 => "s64",
            Primitive::S128 => "s128",
            Primitive::Saddr => "saddr",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::Uaddr => "uaddr",
            Primitive::F16 => "f16",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::F128 => "f128",
            Primitive::D32 => "d32",
            Primitive::D64 => "d64",
            Primitive::D128 => "d128",
            Primitive::Bool => "bool",
            Primitive::Letter => "letter",
            Primitive::Byte => "byte",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|prim| prim.name() == name)
    }

    pub fn from_suffix(suffix: NumericSuffix) -> Self {
        match suffix {
            NumericSuffix::S8 => Primitive::S8,
            NumericSuffix::S16 => Primitive::S16,
            NumericSuffix::S32 => Primitive::S32,
            NumericSuffix::S64 => Primitive::S64,
            NumericSuffix::S128 => Primitive::S128,
            NumericSuffix::Saddr => Primitive::Saddr,
            NumericSuffix::U8 => Primitive::U8,
            NumericSuffix::U16 => Primitive::U16,
            NumericSuffix::U32 => Primitive::U32,
            NumericSuffix::U64 => Primitive::U64,
            NumericSuffix::U128 => Primitive::U128,
            NumericSuffix::Uaddr => Primitive::Uaddr,
            NumericSuffix::F16 => Primitive::F16,
            NumericSuffix::F32 => Primitive::F32,
            NumericSuffix::F64 => Primitive::F64,
            NumericSuffix::F128 => Primitive::F128,
            NumericSuffix::D32 => Primitive::D32,
            NumericSuffix::D64 => Primitive::D64,
            NumericSuffix::D128 => Primitive::D128,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Primitive::S8
                | Primitive::S16
                | Primitive::S32
                | Primitive::S64
                | Primitive::S128
                | Primitive::Saddr
                | Primitive::U8
                | Primitive::U16
                | Primitive::U32
                | Primitive::U64
                | Primitive::U128
                | Primitive::Uaddr
        )
    }

    /// Binary floating point or decimal floating point
    pub fn is_fractional(&self) -> bool {
        matches!(
            self,
            Primitive::F16
                | Primitive::F32
                | Primitive::F64
                | Primitive::F128
                | Primitive::D32
                | Primitive::D64
                | Primitive::D128
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_fractional()
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Arbitrary-precision integer type provided by the Suflae prelude
pub const INTEGER: &str = "Integer";
/// Arbitrary-precision decimal type provided by the Suflae prelude
pub const DECIMAL: &str = "Decimal";
pub const TEXT: &str = "Text";

/// Semantic type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    /// Unsuffixed integer literal; unifies with any integer type
    IntLiteral,
    /// Unsuffixed fractional literal; unifies with any float or decimal type
    FloatLiteral,
    /// Unit type
    Blank,
    /// Record, entity or prelude type: `Point`, `List<s32>`
    Named { name: String, args: Vec<Type> },
    /// Scoped token: `Viewed<T>`, `Hijacked<T>`, `Seized<T>`, `Observed<T>`
    Token { kind: AccessKind, inner: Box<Type> },
    Routine { params: Vec<Type>, ret: Box<Type> },
    /// Generic type parameter
    Param(String),
    /// Result of an earlier error; compatible with everything
    Unknown,
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn text() -> Self {
        Type::named(TEXT)
    }

    pub fn bool() -> Self {
        Type::Primitive(Primitive::Bool)
    }

    pub fn token(kind: AccessKind, inner: Type) -> Self {
        Type::Token {
            kind,
            inner: Box::new(inner),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// The type seen when reading through a token
    pub fn strip_token(&self) -> &Type {
        match self {
            Type::Token { inner, .. } => inner.strip_token(),
            other => other,
        }
    }

    pub fn token_kind(&self) -> Option<AccessKind> {
        match self {
            Type::Token { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Bool))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Type::Named { name, .. } if name == TEXT)
    }

    /// Integer primitive, `Integer`, or an unsuffixed integer literal
    pub fn is_integer_like(&self) -> bool {
        match self {
            Type::Primitive(prim) => prim.is_integer(),
            Type::IntLiteral => true,
            Type::Named { name, .. } => name == INTEGER,
            _ => false,
        }
    }

    /// Float/decimal primitive, `Decimal`, or an unsuffixed fractional literal
    pub fn is_fractional_like(&self) -> bool {
        match self {
            Type::Primitive(prim) => prim.is_fractional(),
            Type::FloatLiteral => true,
            Type::Named { name, .. } => name == DECIMAL,
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer_like() || self.is_fractional_like()
    }

    pub fn is_flexible_literal(&self) -> bool {
        matches!(self, Type::IntLiteral | Type::FloatLiteral)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(prim) => write!(f, "{}", prim),
            Type::IntLiteral => write!(f, "{{integer}}"),
            Type::FloatLiteral => write!(f, "{{float}}"),
            Type::Blank => write!(f, "Blank"),
            Type::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Token { kind, inner } => write!(f, "{}<{}>", kind.token_type_name(), inner),
            Type::Routine { params, ret } => {
                write!(f, "routine(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Param(name) => write!(f, "{}", name),
            Type::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        for prim in Primitive::ALL {
            assert_eq!(Primitive::from_name(prim.name()), Some(prim));
        }
        assert_eq!(Primitive::from_name("int"), None);
        assert_eq!(Primitive::from_suffix(NumericSuffix::D64), Primitive::D64);
    }

    #[test]
    fn test_numeric_families() {
        assert!(Primitive::Uaddr.is_integer());
        assert!(Primitive::D32.is_fractional());
        assert!(!Primitive::Letter.is_numeric());
        assert!(!Primitive::Byte.is_numeric());
        assert!(Type::named(INTEGER).is_integer_like());
        assert!(Type::named(DECIMAL).is_fractional_like());
        assert!(!Type::text().is_numeric());
    }

    #[test]
    fn test_display() {
        let list = Type::Named {
            name: "List".to_string(),
            args: vec![Type::Primitive(Primitive::S32)],
        };
        assert_eq!(list.to_string(), "List<s32>");
        assert_eq!(
            Type::token(AccessKind::ExclusiveView, list.clone()).to_string(),
            "Viewed<List<s32>>"
        );
        let routine = Type::Routine {
            params: vec![list, Type::bool()],
            ret: Box::new(Type::Blank),
        };
        assert_eq!(routine.to_string(), "routine(List<s32>, bool) -> Blank");
        assert_eq!(Type::IntLiteral.to_string(), "{integer}");
    }

    #[test]
    fn test_strip_token() {
        let seized = Type::token(AccessKind::ExclusiveLock, Type::named("Counter"));
        assert_eq!(seized.strip_token(), &Type::named("Counter"));
        assert_eq!(seized.token_kind(), Some(AccessKind::ExclusiveLock));
        assert_eq!(Type::bool().strip_token(), &Type::bool());
    }
}
