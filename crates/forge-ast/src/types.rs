//! Type expression definitions for the AST

use super::*;
use std::fmt;

/// Type expression as written in source
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Named type with optional type arguments: `s32`, `List<Text>`, `Viewed<Point>`
    Named {
        name: Node<Ident>,
        type_args: Vec<Node<TypeExpr>>,
    },

    /// The unit type
    Blank,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: Node::new(Ident::new(name), Span::default()),
            type_args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, type_args: Vec<Node<TypeExpr>>) -> Self {
        TypeExpr::Named {
            name: Node::new(Ident::new(name), Span::default()),
            type_args,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, type_args } => {
                write!(f, "{}", name.value)?;
                if !type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg.value)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeExpr::Blank => write!(f, "Blank"),
        }
    }
}

/// Suffix on a numeric literal (`42u8`, `1.5f32`, `0.1d64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericSuffix {
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
}

impl NumericSuffix {
    pub const ALL: [NumericSuffix; 19] = [
        NumericSuffix::S8,
        NumericSuffix::S16,
        NumericSuffix::S32,
        NumericSuffix::S64,
        NumericSuffix::S128,
        NumericSuffix::Saddr,
        NumericSuffix::U8,
        NumericSuffix::U16,
        NumericSuffix::U32,
        NumericSuffix::U64,
        NumericSuffix::U128,
        NumericSuffix::Uaddr,
        NumericSuffix::F16,
        NumericSuffix::F32,
        NumericSuffix::F64,
        NumericSuffix::F128,
        NumericSuffix::D32,
        NumericSuffix::D64,
        NumericSuffix::D128,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericSuffix::S8 => "s8",
            NumericSuffix::S16 => "s16",
            NumericSuffix::S32 => "s32",
            NumericSuffix::S64 => "s64",
            NumericSuffix::S128 => "s128",
            NumericSuffix::Saddr => "saddr",
            NumericSuffix::U8 => "u8",
            NumericSuffix::U16 => "u16",
            NumericSuffix::U32 => "u32",
            NumericSuffix::U64 => "u64",
            NumericSuffix::U128 => "u128",
            NumericSuffix::Uaddr => "uaddr",
            NumericSuffix::F16 => "f16",
            NumericSuffix::F32 => "f32",
            NumericSuffix::F64 => "f64",
            NumericSuffix::F128 => "f128",
            NumericSuffix::D32 => "d32",
            NumericSuffix::D64 => "d64",
            NumericSuffix::D128 => "d128",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|suffix| suffix.as_str() == s)
    }

    pub fn is_integer(&self) -> bool {
        !matches!(
            self,
            NumericSuffix::F16
                | NumericSuffix::F32
                | NumericSuffix::F64
                | NumericSuffix::F128
                | NumericSuffix::D32
                | NumericSuffix::D64
                | NumericSuffix::D128
        )
    }
}

impl fmt::Display for NumericSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
