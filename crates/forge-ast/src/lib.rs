//! # Forge AST
//!
//! Abstract Syntax Tree shared by the RazorForge and Suflae front ends.
//! Both languages parse into the same node set; the semantic analyzer
//! decides which constructs each language may use.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.file_id, self.start, self.end)
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Declaration visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod module;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 9, 1);
        let b = Span::new(2, 6, 1);
        assert_eq!(a.merge(&b), Span::new(2, 9, 1));
        assert_eq!(format!("{}", a), "1:4..9");
    }

    #[test]
    fn test_access_forms() {
        assert_eq!(format!("{}", AccessForm::Viewing), "viewing");
        assert_eq!(format!("{}", AccessForm::Observing), "observing");
        assert_eq!(AccessForm::Hijacking.token_type_name(), "Hijacked");
    }

    #[test]
    fn test_binary_op() {
        assert_eq!(format!("{}", BinaryOp::Add), "+");
        assert_eq!(format!("{}", BinaryOp::And), "and");
        assert!(BinaryOp::Mul.is_arithmetic());
        assert!(BinaryOp::LtEq.is_comparison());
        assert!(!BinaryOp::Or.is_arithmetic());
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(NumericSuffix::from_str_opt("s32"), Some(NumericSuffix::S32));
        assert_eq!(NumericSuffix::from_str_opt("d128"), Some(NumericSuffix::D128));
        assert_eq!(NumericSuffix::from_str_opt("i32"), None);
        assert!(NumericSuffix::U8.is_integer());
        assert!(!NumericSuffix::F16.is_integer());
    }

    #[test]
    fn test_type_expr_display() {
        let list = TypeExpr::generic(
            "List",
            vec![Node::new(TypeExpr::named("s32"), dummy_span())],
        );
        assert_eq!(format!("{}", list), "List<s32>");
        assert_eq!(format!("{}", TypeExpr::Blank), "Blank");
    }

    #[test]
    fn test_scoped_access_stmt() {
        let access = ScopedAccess {
            form: AccessForm::Seizing,
            source: Node::new(Ident::new("counter"), dummy_span()),
            token: Node::new(Ident::new("c"), dummy_span()),
            body: Node::new(Block { stmts: vec![] }, dummy_span()),
        };
        let stmt = Stmt::ScopedAccess(access);
        assert!(matches!(stmt, Stmt::ScopedAccess(ScopedAccess { form: AccessForm::Seizing, .. })));
    }

    #[test]
    fn test_routine_decl() {
        let routine = RoutineDecl {
            name: Node::new(Ident::new("take"), dummy_span()),
            params: vec![],
            return_type: None,
            body: Some(Node::new(Block { stmts: vec![] }, dummy_span())),
            visibility: Visibility::Public,
            is_usurping: true,
        };

        assert_eq!(routine.name.value.name, "take");
        assert!(routine.is_usurping);
    }
}
