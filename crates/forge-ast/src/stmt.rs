//! Statement definitions for the AST

use super::*;
use std::fmt;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement
    Expr(Node<Expr>),

    /// Variable declaration: let/var name: Type = value
    VarDecl(VarDecl),

    /// Assignment: target = value
    Assign {
        target: Node<Expr>,
        value: Node<Expr>,
    },

    /// Return statement
    Return(Option<Node<Expr>>),

    /// If statement
    If {
        condition: Node<Expr>,
        then_block: Node<Block>,
        else_branch: Option<Box<Node<Stmt>>>,
    },

    /// While loop
    While {
        condition: Node<Expr>,
        body: Node<Block>,
    },

    /// For loop: for item in iterable { body }
    For {
        binding: Node<Ident>,
        iterable: Node<Expr>,
        body: Node<Block>,
    },

    /// Pattern match: when subject { arms }
    When {
        subject: Node<Expr>,
        arms: Vec<WhenArm>,
    },

    /// Block statement: { stmts }
    Block(Block),

    /// danger! { stmts }
    Danger(Node<Block>),

    /// mayhem! { stmts }
    Mayhem(Node<Block>),

    /// viewing/hijacking/seizing/observing source as token { body }
    ScopedAccess(ScopedAccess),

    /// Break statement
    Break,

    /// Continue statement
    Continue,

    /// Throw statement
    Throw(Node<Expr>),
}

/// Block of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub name: Node<Ident>,
    pub type_annotation: Option<Node<TypeExpr>>,
    pub init: Option<Node<Expr>>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
    /// Immutable binding
    Let,
    /// Mutable binding
    Var,
}

/// One arm of a when statement
#[derive(Debug, Clone, PartialEq)]
pub struct WhenArm {
    pub pattern: Node<WhenPattern>,
    pub guard: Option<Node<Expr>>,
    pub body: Node<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhenPattern {
    /// else => ...
    Else,
    /// 42 => ...
    Literal(Literal),
    /// n => ... (binds the subject)
    Binding(Node<Ident>),
}

/// Scoped-access statement
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedAccess {
    pub form: AccessForm,
    pub source: Node<Ident>,
    pub token: Node<Ident>,
    pub body: Node<Block>,
}

/// The four scoped-access forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessForm {
    /// Temporary exclusive read view
    Viewing,
    /// Temporary exclusive mutable access
    Hijacking,
    /// Exclusive lock on a shared value
    Seizing,
    /// Shared read lock on a shared value
    Observing,
}

impl AccessForm {
    /// Name of the token type the form produces
    pub fn token_type_name(&self) -> &'static str {
        match self {
            AccessForm::Viewing => "Viewed",
            AccessForm::Hijacking => "Hijacked",
            AccessForm::Seizing => "Seized",
            AccessForm::Observing => "Observed",
        }
    }
}

impl fmt::Display for AccessForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessForm::Viewing => "viewing",
            AccessForm::Hijacking => "hijacking",
            AccessForm::Seizing => "seizing",
            AccessForm::Observing => "observing",
        };
        write!(f, "{}", s)
    }
}
