//! Semantic errors and the diagnostics collector

use forge_ast::{BinaryOp, Span};
use thiserror::Error;

use crate::config::Language;
use crate::modes::{ModeRequirement, ModeViolation};
use crate::ownership::{AccessKind, EscapeReason, OwnershipViolation};
use crate::symbols::SymbolError;
use crate::types::Type;

/// Semantic error kinds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("duplicate declaration of '{0}' in this scope")]
    DuplicateDeclaration(String),

    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Type, found: Type },

    #[error("cannot apply '{op}' to {left} and {right}; convert one side explicitly")]
    MixedTypeArithmetic { op: BinaryOp, left: Type, right: Type },

    #[error("'{variable}' cannot be used while it is {kind} as '{token}'")]
    SourceInvalidatedAccess {
        variable: String,
        token: String,
        kind: AccessKind,
    },

    #[error("scoped token '{token}' escapes its construct: {reason}")]
    TokenEscapeScope { token: String, reason: EscapeReason },

    #[error("{operation} requires {requirement}")]
    ModeRequiredViolation {
        operation: String,
        requirement: ModeRequirement,
    },

    #[error("cannot load module '{path}': {reason}")]
    ModuleLoadFailure { path: String, reason: String },

    #[error("use of moved value '{0}'")]
    UseAfterMove(String),

    #[error("cannot assign to immutable binding '{0}'")]
    AssignToImmutable(String),

    #[error("cannot write through '{token}': it is only {kind}")]
    ReadOnlyToken { token: String, kind: AccessKind },

    #[error("'{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' is not a routine")]
    NotCallable(String),

    #[error("{ty} has no member '{member}'")]
    UnknownMember { ty: Type, member: String },

    #[error("{construct} is not available in {language}")]
    UnsupportedConstruct { construct: String, language: Language },

    #[error("cannot infer a type for '{0}' without an annotation or initializer")]
    CannotInferType(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("internal analyzer error: {0}")]
    Internal(String),
}

impl ErrorKind {
    pub fn mode_required(operation: impl Into<String>, violation: ModeViolation) -> Self {
        ErrorKind::ModeRequiredViolation {
            operation: operation.into(),
            requirement: violation.requirement,
        }
    }
}

impl From<OwnershipViolation> for ErrorKind {
    fn from(violation: OwnershipViolation) -> Self {
        match violation {
            OwnershipViolation::AccessConflict {
                variable,
                token,
                kind,
            }
            | OwnershipViolation::SourceInvalidated {
                variable,
                token,
                kind,
            } => ErrorKind::SourceInvalidatedAccess {
                variable,
                token,
                kind,
            },
            OwnershipViolation::TokenEscape { token, reason } => {
                ErrorKind::TokenEscapeScope { token, reason }
            }
            OwnershipViolation::ReadOnlyToken { token, kind } => {
                ErrorKind::ReadOnlyToken { token, kind }
            }
        }
    }
}

impl From<SymbolError> for ErrorKind {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::Duplicate(name) => ErrorKind::DuplicateDeclaration(name),
            SymbolError::NotFound(name) => ErrorKind::UndefinedSymbol(name),
            SymbolError::ScopeUnderflow => ErrorKind::Internal(err.to_string()),
        }
    }
}

/// Semantic error with location information
#[derive(Debug, Clone, PartialEq, Error)]
#[error("semantic error at {span}: {kind}")]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.kind, ErrorKind::Internal(_))
    }
}

/// Ordered collection of errors found during one analysis
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SemanticError) {
        tracing::debug!(span = %error.span, "{}", error.kind);
        self.errors.push(error);
    }

    pub fn report(&mut self, kind: ErrorKind, span: Span) {
        self.push(SemanticError::new(kind, span));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<SemanticError> {
        self.errors
    }
}
