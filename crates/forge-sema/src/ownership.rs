//! Scoped-token tracking
//!
//! A scoped-access construct (`viewing`, `hijacking`, `seizing`,
//! `observing`) binds a token to a source variable for the extent of its
//! body. While the token lives the source is *invalidated*: any direct use
//! of it is rejected, and the token itself may not outlive the construct.
//!
//! Bindings are identified by name plus the scope depth that declared
//! them, so a shadowing binding never aliases the one it hides.

use std::collections::HashMap;
use std::fmt;
use forge_ast::{AccessForm, Span};
use thiserror::Error;

/// Access kind a scoped token grants over its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// `viewing`: exclusive read-only access to a single-owner value
    ExclusiveView,
    /// `hijacking`: exclusive mutable access to a single-owner value
    ExclusiveTransfer,
    /// `seizing`: exclusive lock on a shared value
    ExclusiveLock,
    /// `observing`: shared read lock on a shared value
    SharedLock,
}

impl AccessKind {
    pub fn from_form(form: AccessForm) -> Self {
        match form {
            AccessForm::Viewing => AccessKind::ExclusiveView,
            AccessForm::Hijacking => AccessKind::ExclusiveTransfer,
            AccessForm::Seizing => AccessKind::ExclusiveLock,
            AccessForm::Observing => AccessKind::SharedLock,
        }
    }

    pub fn form(&self) -> AccessForm {
        match self {
            AccessKind::ExclusiveView => AccessForm::Viewing,
            AccessKind::ExclusiveTransfer => AccessForm::Hijacking,
            AccessKind::ExclusiveLock => AccessForm::Seizing,
            AccessKind::SharedLock => AccessForm::Observing,
        }
    }

    /// Parse a token type constructor name (`Viewed`, `Hijacked`, ...)
    pub fn from_token_type_name(name: &str) -> Option<Self> {
        match name {
            "Viewed" => Some(AccessKind::ExclusiveView),
            "Hijacked" => Some(AccessKind::ExclusiveTransfer),
            "Seized" => Some(AccessKind::ExclusiveLock),
            "Observed" => Some(AccessKind::SharedLock),
            _ => None,
        }
    }

    pub fn token_type_name(&self) -> &'static str {
        self.form().token_type_name()
    }

    /// Whether the token may be written through
    pub fn allows_write(&self) -> bool {
        matches!(self, AccessKind::ExclusiveTransfer | AccessKind::ExclusiveLock)
    }

    /// Two accesses to the same source may overlap only when both are shared locks
    pub fn compatible_with(&self, other: AccessKind) -> bool {
        *self == AccessKind::SharedLock && other == AccessKind::SharedLock
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessKind::ExclusiveView => "exclusively viewed",
            AccessKind::ExclusiveTransfer => "hijacked",
            AccessKind::ExclusiveLock => "seized",
            AccessKind::SharedLock => "observed",
        };
        write!(f, "{}", s)
    }
}

/// A binding identified by name and declaring scope depth
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub name: String,
    pub depth: usize,
}

impl BindingKey {
    pub fn new(name: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            depth,
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.depth)
    }
}

/// A live scoped token
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedToken {
    pub key: BindingKey,
    pub source: BindingKey,
    pub kind: AccessKind,
    pub span: Span,
}

impl ScopedToken {
    /// Depth of the construct that created the token
    pub fn depth(&self) -> usize {
        self.key.depth
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveAccess {
    token: BindingKey,
    kind: AccessKind,
}

/// How a binding is being used at a particular site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Read,
    Write,
    /// Value of a `return` statement
    Return,
    /// Call argument; `transient` when the parameter is itself a token type
    Argument { transient: bool },
    /// Stored into a binding declared at `target_depth`
    Store { target_depth: usize },
}

/// Why a token use counts as escaping its construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeReason {
    ReturnedFromRoutine,
    ReturnedWithoutTransfer,
    PassedToOwningParameter,
    StoredInOuterBinding,
    OutlivedConstruct,
}

impl fmt::Display for EscapeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EscapeReason::ReturnedFromRoutine => "returned from a routine that is not usurping",
            EscapeReason::ReturnedWithoutTransfer => {
                "returned from a usurping routine, which may only return hijacked tokens"
            }
            EscapeReason::PassedToOwningParameter => "passed to a parameter that takes ownership",
            EscapeReason::StoredInOuterBinding => "stored into a binding that outlives it",
            EscapeReason::OutlivedConstruct => "used after its construct ended",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnershipViolation {
    #[error("'{variable}' is already {kind} as '{token}'")]
    AccessConflict {
        variable: String,
        token: String,
        kind: AccessKind,
    },
    #[error("'{variable}' cannot be used while {kind} as '{token}'")]
    SourceInvalidated {
        variable: String,
        token: String,
        kind: AccessKind,
    },
    #[error("token '{token}' {reason}")]
    TokenEscape { token: String, reason: EscapeReason },
    #[error("token '{token}' is only {kind} and cannot be written through")]
    ReadOnlyToken { token: String, kind: AccessKind },
}

/// Registry of live tokens and the sources they invalidate
#[derive(Debug, Clone, Default)]
pub struct OwnershipTracker {
    tokens: HashMap<BindingKey, ScopedToken>,
    invalidated: HashMap<BindingKey, Vec<ActiveAccess>>,
}

impl OwnershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scoped access on `source`, creating token `token_name` at `depth`
    pub fn begin_access(
        &mut self,
        source: BindingKey,
        token_name: &str,
        kind: AccessKind,
        depth: usize,
        span: Span,
    ) -> Result<BindingKey, OwnershipViolation> {
        if let Some(active) = self.invalidated.get(&source) {
            if let Some(conflict) = active.iter().find(|access| !access.kind.compatible_with(kind)) {
                return Err(OwnershipViolation::AccessConflict {
                    variable: source.name.clone(),
                    token: conflict.token.name.clone(),
                    kind: conflict.kind,
                });
            }
        }

        let key = BindingKey::new(token_name, depth);
        tracing::trace!(source = %source, token = %key, ?kind, "begin scoped access");
        self.invalidated
            .entry(source.clone())
            .or_default()
            .push(ActiveAccess {
                token: key.clone(),
                kind,
            });
        self.tokens.insert(
            key.clone(),
            ScopedToken {
                key: key.clone(),
                source,
                kind,
                span,
            },
        );
        Ok(key)
    }

    /// Close the access held by `token`, restoring its source once no other access remains
    pub fn end_access(&mut self, token: &BindingKey) -> Option<ScopedToken> {
        let scoped = self.tokens.remove(token)?;
        if let Some(active) = self.invalidated.get_mut(&scoped.source) {
            active.retain(|access| &access.token != token);
            if active.is_empty() {
                self.invalidated.remove(&scoped.source);
            }
        }
        tracing::trace!(token = %token, source = %scoped.source, "end scoped access");
        Some(scoped)
    }

    /// End every access whose token was created at `depth` or deeper
    pub fn retire_depth(&mut self, depth: usize) -> Vec<ScopedToken> {
        let stale: Vec<BindingKey> = self
            .tokens
            .keys()
            .filter(|key| key.depth >= depth)
            .cloned()
            .collect();
        stale.iter().filter_map(|key| self.end_access(key)).collect()
    }

    /// Validate one use of `binding` made at `current_depth`
    pub fn check_use(
        &self,
        binding: &BindingKey,
        current_depth: usize,
        use_kind: UseKind,
        in_usurping: bool,
    ) -> Result<(), OwnershipViolation> {
        if let Some(access) = self.invalidated.get(binding).and_then(|active| active.last()) {
            return Err(OwnershipViolation::SourceInvalidated {
                variable: binding.name.clone(),
                token: access.token.name.clone(),
                kind: access.kind,
            });
        }

        match self.tokens.get(binding) {
            Some(token) => Self::check_token_use(
                &binding.name,
                token.kind,
                token.depth(),
                current_depth,
                use_kind,
                in_usurping,
            ),
            None => Ok(()),
        }
    }

    /// Usage rules shared by construct tokens and token-typed parameters
    pub fn check_token_use(
        name: &str,
        kind: AccessKind,
        token_depth: usize,
        current_depth: usize,
        use_kind: UseKind,
        in_usurping: bool,
    ) -> Result<(), OwnershipViolation> {
        let escape = |reason| {
            Err(OwnershipViolation::TokenEscape {
                token: name.to_string(),
                reason,
            })
        };

        if token_depth > current_depth {
            return escape(EscapeReason::OutlivedConstruct);
        }

        match use_kind {
            UseKind::Read => Ok(()),
            UseKind::Write if kind.allows_write() => Ok(()),
            UseKind::Write => Err(OwnershipViolation::ReadOnlyToken {
                token: name.to_string(),
                kind,
            }),
            UseKind::Return if in_usurping && kind == AccessKind::ExclusiveTransfer => Ok(()),
            UseKind::Return if in_usurping => escape(EscapeReason::ReturnedWithoutTransfer),
            UseKind::Return => escape(EscapeReason::ReturnedFromRoutine),
            UseKind::Argument { transient: true } => Ok(()),
            UseKind::Argument { transient: false } => escape(EscapeReason::PassedToOwningParameter),
            UseKind::Store { target_depth } if target_depth >= token_depth => Ok(()),
            UseKind::Store { .. } => escape(EscapeReason::StoredInOuterBinding),
        }
    }

    pub fn token(&self, key: &BindingKey) -> Option<&ScopedToken> {
        self.tokens.get(key)
    }

    pub fn is_invalidated(&self, key: &BindingKey) -> bool {
        self.invalidated.contains_key(key)
    }

    /// The most recent access holding `key` invalidated: (token depth, kind)
    pub fn invalidation(&self, key: &BindingKey) -> Option<(usize, AccessKind)> {
        self.invalidated
            .get(key)
            .and_then(|active| active.last())
            .map(|access| (access.token.depth, access.kind))
    }

    pub fn live_tokens(&self) -> impl Iterator<Item = &ScopedToken> {
        self.tokens.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.invalidated.is_empty()
    }
}
