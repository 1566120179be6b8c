//! Declaration definitions for the AST

use super::*;

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// Routine (function) declaration
    Routine(RoutineDecl),

    /// Record declaration (value semantics)
    Record(TypeDecl),

    /// Entity declaration (reference semantics)
    Entity(TypeDecl),

    /// Module-level variable
    Var(VarDecl),
}

impl Decl {
    pub fn name(&self) -> &Node<Ident> {
        match self {
            Decl::Routine(routine) => &routine.name,
            Decl::Record(decl) | Decl::Entity(decl) => &decl.name,
            Decl::Var(var) => &var.name,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Decl::Routine(routine) => routine.visibility,
            Decl::Record(decl) | Decl::Entity(decl) => decl.visibility,
            Decl::Var(var) => var.visibility,
        }
    }
}

/// Routine declaration
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDecl {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<Node<TypeExpr>>,
    /// None for external routine signatures
    pub body: Option<Node<Block>>,
    pub visibility: Visibility,
    /// `usurping routine`: may return a hijacked token
    pub is_usurping: bool,
}

/// Routine parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Node<Ident>,
    pub type_annotation: Node<TypeExpr>,
}

/// Record or entity declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: Node<Ident>,
    pub type_params: Vec<Node<Ident>>,
    pub fields: Vec<FieldDecl>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Node<Ident>,
    pub type_annotation: Node<TypeExpr>,
    pub visibility: Visibility,
}
