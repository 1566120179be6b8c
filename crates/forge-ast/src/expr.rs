//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Identifier
    Ident(Ident),

    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Unary operation: op expr
    Unary {
        op: UnaryOp,
        expr: Box<Node<Expr>>,
    },

    /// Routine call: callee(args)
    Call {
        callee: Box<Node<Expr>>,
        args: Vec<Node<Expr>>,
    },

    /// Member access: object.property
    Member {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },

    /// Index access: object[index]
    Index {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },

    /// Record construction: Point(x: 1, y: 2)
    Construct {
        type_name: Node<Ident>,
        fields: Vec<FieldInit>,
    },

    /// Explicit conversion: expr as T
    Convert {
        expr: Box<Node<Expr>>,
        target: Node<TypeExpr>,
    },

    /// Raw memory operation (only legal in danger or mayhem blocks)
    Raw {
        op: RawOp,
        type_arg: Option<Node<TypeExpr>>,
        args: Vec<Node<Expr>>,
    },

    /// Inline scoped access: viewing x as v => expr
    ScopedAccess {
        form: AccessForm,
        source: Node<Ident>,
        token: Node<Ident>,
        body: Box<Node<Expr>>,
    },

    /// Parenthesized expression
    Paren(Box<Node<Expr>>),
}

impl Expr {
    /// The identifier this expression names directly, looking through parentheses
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            Expr::Paren(inner) => inner.value.as_ident(),
            _ => None,
        }
    }
}

/// Field initializer in a record construction
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Node<Ident>,
    pub value: Node<Expr>,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer {
        value: u128,
        suffix: Option<NumericSuffix>,
    },
    Float {
        value: f64,
        suffix: Option<NumericSuffix>,
    },
    Bool(bool),
    Text(String),
    Letter(char),
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
        )
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

/// Raw memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawOp {
    /// address_of!(x): the address of a variable
    AddressOf,
    /// read_as!<T>(addr): reinterpret memory at addr as T
    ReadAs,
    /// write_as!<T>(addr, value): store value at addr
    WriteAs,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
            UnaryOp::BitNot => "~",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for RawOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RawOp::AddressOf => "address_of!",
            RawOp::ReadAs => "read_as!",
            RawOp::WriteAs => "write_as!",
        };
        write!(f, "{}", s)
    }
}
