//! Module system definitions for the AST

use super::*;

/// Module item (top-level in a module)
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Import declaration
    Import(ImportDecl),

    /// Declaration
    Decl(Node<Decl>),
}

/// Import declaration: `import collections/List` or `import io/Console as console`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<Node<Ident>>,
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Node<ModuleItem>>,
    pub span: Span,
}

impl Program {
    /// Import paths in source order
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match &item.value {
            ModuleItem::Import(import) => Some(import),
            ModuleItem::Decl(_) => None,
        })
    }

    pub fn decls(&self) -> impl Iterator<Item = &Node<Decl>> {
        self.items.iter().filter_map(|item| match &item.value {
            ModuleItem::Decl(decl) => Some(decl),
            ModuleItem::Import(_) => None,
        })
    }
}
