//! Scoped symbol table
//!
//! Scope 0 is the root scope holding built-in types and prelude
//! declarations; scope 1 is the module scope for user top-level
//! declarations. Each block, routine body and scoped-access construct
//! pushes a further scope.

use std::collections::HashMap;
use forge_ast::{Span, Visibility};
use thiserror::Error;

use crate::ownership::{AccessKind, BindingKey};
use crate::types::{Primitive, Type, TEXT};

/// Value or reference semantics of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantics {
    /// Copied on assignment (records, primitives)
    Value,
    /// Moved on assignment in RazorForge (entities, collection entities)
    Reference,
}

/// Whether a binding still holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Live,
    Moved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// Primitive, entity or generic parameter type
    Type {
        semantics: Semantics,
        fields: Vec<(String, Type)>,
        type_params: Vec<String>,
    },
    /// Record type
    Struct {
        fields: Vec<(String, Type)>,
        type_params: Vec<String>,
    },
    Function {
        usurping: bool,
    },
    Variable {
        mutable: bool,
        state: BindingState,
    },
    /// `import a/b as alias`
    ModuleAlias {
        module: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub visibility: Visibility,
    /// Depth of the declaring scope; set by [`SymbolTable::declare`]
    pub depth: usize,
    pub span: Span,
}

impl Symbol {
    fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            visibility: Visibility::Private,
            depth: 0,
            span,
        }
    }

    pub fn variable(name: impl Into<String>, ty: Type, mutable: bool, span: Span) -> Self {
        Self::new(
            name,
            SymbolKind::Variable {
                mutable,
                state: BindingState::Live,
            },
            ty,
            span,
        )
    }

    pub fn function(name: impl Into<String>, ty: Type, usurping: bool, span: Span) -> Self {
        Self::new(name, SymbolKind::Function { usurping }, ty, span)
    }

    pub fn record(
        name: impl Into<String>,
        fields: Vec<(String, Type)>,
        type_params: Vec<String>,
        span: Span,
    ) -> Self {
        let name = name.into();
        let ty = Type::named(name.clone());
        Self::new(name, SymbolKind::Struct { fields, type_params }, ty, span)
    }

    pub fn entity(
        name: impl Into<String>,
        fields: Vec<(String, Type)>,
        type_params: Vec<String>,
        span: Span,
    ) -> Self {
        let name = name.into();
        let ty = Type::named(name.clone());
        let kind = SymbolKind::Type {
            semantics: Semantics::Reference,
            fields,
            type_params,
        };
        Self::new(name, kind, ty, span)
    }

    /// Value-semantics type symbol with no fields (primitives, type parameters)
    pub fn opaque_type(name: impl Into<String>, ty: Type, span: Span) -> Self {
        let kind = SymbolKind::Type {
            semantics: Semantics::Value,
            fields: Vec::new(),
            type_params: Vec::new(),
        };
        Self::new(name, kind, ty, span)
    }

    pub fn module_alias(name: impl Into<String>, module: impl Into<String>, span: Span) -> Self {
        let kind = SymbolKind::ModuleAlias {
            module: module.into(),
        };
        Self::new(name, kind, Type::Unknown, span)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.name.clone(), self.depth)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::Type { .. } | SymbolKind::Struct { .. })
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { mutable: true, .. })
    }

    pub fn is_moved(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Variable {
                state: BindingState::Moved,
                ..
            }
        )
    }

    /// Access kind when this binding holds a scoped token
    pub fn token_kind(&self) -> Option<AccessKind> {
        match self.kind {
            SymbolKind::Variable { .. } => self.ty.token_kind(),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[(String, Type)]> {
        match &self.kind {
            SymbolKind::Type { fields, .. } | SymbolKind::Struct { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn type_params(&self) -> &[String] {
        match &self.kind {
            SymbolKind::Type { type_params, .. } | SymbolKind::Struct { type_params, .. } => {
                type_params
            }
            _ => &[],
        }
    }

    pub fn semantics(&self) -> Option<Semantics> {
        match &self.kind {
            SymbolKind::Type { semantics, .. } => Some(*semantics),
            SymbolKind::Struct { .. } => Some(Semantics::Value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("duplicate declaration of '{0}'")]
    Duplicate(String),
    #[error("undefined symbol '{0}'")]
    NotFound(String),
    #[error("cannot pop the root scope")]
    ScopeUnderflow,
}

/// One level of the scope stack
#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    order: Vec<String>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Stack of scopes, innermost last
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub const ROOT_DEPTH: usize = 0;
    pub const MODULE_DEPTH: usize = 1;

    /// Create a table whose root scope holds the built-in types
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![Scope::default()],
        };
        table.declare_builtins();
        table
    }

    fn declare_builtins(&mut self) {
        let root = &mut self.scopes[Self::ROOT_DEPTH];
        let builtins = Primitive::ALL
            .iter()
            .map(|prim| Symbol::opaque_type(prim.name(), Type::Primitive(*prim), Span::default()))
            .chain([
                Symbol::record("Blank", Vec::new(), Vec::new(), Span::default()),
                Symbol::record(TEXT, Vec::new(), Vec::new(), Span::default()),
            ]);
        for mut symbol in builtins {
            if symbol.name == "Blank" {
                symbol.ty = Type::Blank;
            }
            root.order.push(symbol.name.clone());
            root.symbols.insert(symbol.name.clone(), symbol.with_visibility(Visibility::Public));
        }
    }

    /// Depth of the innermost scope
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Push a new scope and return its depth
    pub fn push_scope(&mut self) -> usize {
        self.scopes.push(Scope::default());
        self.depth()
    }

    pub fn pop_scope(&mut self) -> Result<Scope, SymbolError> {
        if self.scopes.len() <= 1 {
            return Err(SymbolError::ScopeUnderflow);
        }
        self.scopes.pop().ok_or(SymbolError::ScopeUnderflow)
    }

    /// Declare into the innermost scope
    pub fn declare(&mut self, mut symbol: Symbol) -> Result<BindingKey, SymbolError> {
        let depth = self.depth();
        let scope = self
            .scopes
            .last_mut()
            .ok_or(SymbolError::ScopeUnderflow)?;
        if scope.contains(&symbol.name) {
            return Err(SymbolError::Duplicate(symbol.name));
        }
        symbol.depth = depth;
        let key = symbol.key();
        scope.order.push(symbol.name.clone());
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(key)
    }

    pub fn lookup(&self, name: &str) -> Result<&Symbol, SymbolError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| SymbolError::NotFound(name.to_string()))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut Symbol, SymbolError> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(name))
            .ok_or_else(|| SymbolError::NotFound(name.to_string()))
    }

    pub fn lookup_in_current(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn scope(&self, depth: usize) -> Option<&Scope> {
        self.scopes.get(depth)
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[Self::ROOT_DEPTH]
    }

    /// The user module scope, once analysis has pushed it
    pub fn module_scope(&self) -> Option<&Scope> {
        self.scope(Self::MODULE_DEPTH)
    }

    /// Mark a binding moved or live again
    pub fn set_state(&mut self, name: &str, new_state: BindingState) -> Result<(), SymbolError> {
        if let SymbolKind::Variable { state, .. } = &mut self.lookup_mut(name)?.kind {
            *state = new_state;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol::variable(name, ty, false, Span::default())
    }

    #[test]
    fn test_builtins_in_root() {
        let table = SymbolTable::new();
        assert_eq!(table.depth(), SymbolTable::ROOT_DEPTH);
        for name in ["s8", "u128", "saddr", "uaddr", "f16", "d128", "bool", "letter", "byte"] {
            assert!(table.root().contains(name), "missing builtin {}", name);
        }
        assert_eq!(table.lookup("Blank").unwrap().ty, Type::Blank);
        assert_eq!(table.lookup("Text").unwrap().ty, Type::text());
        assert_eq!(table.lookup("s32").unwrap().semantics(), Some(Semantics::Value));
    }

    #[test]
    fn test_shadowing_and_depth() {
        let mut table = SymbolTable::new();
        table.push_scope();
        let outer = table.declare(var("x", Type::bool())).unwrap();
        assert_eq!(outer, BindingKey::new("x", 1));

        table.push_scope();
        let inner = table
            .declare(var("x", Type::Primitive(Primitive::S32)))
            .unwrap();
        assert_eq!(inner.depth, 2);
        assert_eq!(table.lookup("x").unwrap().ty, Type::Primitive(Primitive::S32));

        table.pop_scope().unwrap();
        assert_eq!(table.lookup("x").unwrap().ty, Type::bool());
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table.declare(var("y", Type::bool())).unwrap();
        assert_eq!(
            table.declare(var("y", Type::bool())),
            Err(SymbolError::Duplicate("y".to_string()))
        );
        assert!(table.lookup_in_current("y").is_some());
    }

    #[test]
    fn test_pop_root_fails() {
        let mut table = SymbolTable::new();
        assert_eq!(table.pop_scope().unwrap_err(), SymbolError::ScopeUnderflow);
        assert!(matches!(table.lookup("nope"), Err(SymbolError::NotFound(_))));
    }

    #[test]
    fn test_move_state() {
        let mut table = SymbolTable::new();
        table.push_scope();
        table
            .declare(Symbol::variable("list", Type::named("List"), true, Span::default()))
            .unwrap();
        table.set_state("list", BindingState::Moved).unwrap();
        assert!(table.lookup("list").unwrap().is_moved());
        table.set_state("list", BindingState::Live).unwrap();
        assert!(!table.lookup("list").unwrap().is_moved());
    }

    #[test]
    fn test_scope_iteration_order() {
        let mut table = SymbolTable::new();
        table.push_scope();
        for name in ["c", "a", "b"] {
            table.declare(var(name, Type::bool())).unwrap();
        }
        let names: Vec<_> = table.module_scope().unwrap().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
