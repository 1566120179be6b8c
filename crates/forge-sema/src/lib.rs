//! # Forge Semantic Analyzer
//!
//! Single-pass semantic analysis shared by RazorForge and Suflae.
//! Resolves names through a scoped symbol table, checks types without
//! implicit numeric conversion, enforces scoped-token ownership rules and
//! validates that unsafe operations only appear in danger/mayhem blocks.
//! All errors are collected; analysis never stops at the first one.

mod error;
mod types;
mod config;
mod ownership;
mod modes;
mod symbols;
mod modules;
mod helpers;
mod analyzer;
mod prelude;
mod decl_checker;
mod stmt_checker;
mod expr_checker;
mod access_checker;

// Re-export public API
pub use error::{Diagnostics, ErrorKind, SemanticError};
pub use types::{Primitive, Type};
pub use config::{AnalyzerConfig, ConfigError, Language};
pub use ownership::{AccessKind, BindingKey, EscapeReason, OwnershipTracker, OwnershipViolation, ScopedToken, UseKind};
pub use modes::{ContextModes, Mode, ModeRequirement, ModeViolation};
pub use symbols::{BindingState, Scope, Semantics, Symbol, SymbolError, SymbolKind, SymbolTable};
pub use modules::{prelude_modules, ModuleError, ModuleInfo, ModuleLoader, NoModules, CORE_PRELUDE, SUFLAE_PRELUDE};
pub use helpers::TypeHelpers;
pub use analyzer::{Analysis, SemanticAnalyzer};

use forge_ast::Program;

// =============================================================================
// Public API
// =============================================================================

/// Analyze a program, loading the prelude and imports through `loader`
pub fn analyze(program: &Program, config: &AnalyzerConfig, loader: &mut dyn ModuleLoader) -> Analysis {
    SemanticAnalyzer::new(config.clone(), loader).analyze(program)
}

// =============================================================================
// Tests
// =============================================================================
