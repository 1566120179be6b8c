//! Context modes active at the current traversal point

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Inside `danger!`
    Danger,
    /// Inside `mayhem!`
    Mayhem,
    /// Evaluating the guard of a `when` arm
    WhenGuard,
    /// Inside the body of a usurping routine
    Usurping,
}

/// Precondition an operation places on the active modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequirement {
    DangerOrMayhem,
    OutsideWhenGuard,
}

impl fmt::Display for ModeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeRequirement::DangerOrMayhem => write!(f, "an enclosing danger! or mayhem! block"),
            ModeRequirement::OutsideWhenGuard => write!(f, "a context outside of when guards"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requires {requirement}")]
pub struct ModeViolation {
    pub requirement: ModeRequirement,
}

/// Nesting counters for each mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextModes {
    danger: u32,
    mayhem: u32,
    when_guard: u32,
    usurping: u32,
}

impl ContextModes {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&mut self, mode: Mode) -> &mut u32 {
        match mode {
            Mode::Danger => &mut self.danger,
            Mode::Mayhem => &mut self.mayhem,
            Mode::WhenGuard => &mut self.when_guard,
            Mode::Usurping => &mut self.usurping,
        }
    }

    pub fn push(&mut self, mode: Mode) {
        *self.counter(mode) += 1;
    }

    pub fn pop(&mut self, mode: Mode) {
        let counter = self.counter(mode);
        debug_assert!(*counter > 0, "unbalanced pop of {:?}", mode);
        *counter = counter.saturating_sub(1);
    }

    pub fn is_active(&self, mode: Mode) -> bool {
        let count = match mode {
            Mode::Danger => self.danger,
            Mode::Mayhem => self.mayhem,
            Mode::WhenGuard => self.when_guard,
            Mode::Usurping => self.usurping,
        };
        count > 0
    }

    pub fn in_unsafe_region(&self) -> bool {
        self.is_active(Mode::Danger) || self.is_active(Mode::Mayhem)
    }

    pub fn require(&self, requirement: ModeRequirement) -> Result<(), ModeViolation> {
        let satisfied = match requirement {
            ModeRequirement::DangerOrMayhem => self.in_unsafe_region(),
            ModeRequirement::OutsideWhenGuard => !self.is_active(Mode::WhenGuard),
        };
        if satisfied {
            Ok(())
        } else {
            Err(ModeViolation { requirement })
        }
    }

    /// No mode is active
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_modes() {
        let mut modes = ContextModes::new();
        assert!(modes.require(ModeRequirement::DangerOrMayhem).is_err());

        modes.push(Mode::Danger);
        modes.push(Mode::Danger);
        modes.pop(Mode::Danger);
        assert!(modes.is_active(Mode::Danger));
        assert!(modes.require(ModeRequirement::DangerOrMayhem).is_ok());

        modes.pop(Mode::Danger);
        assert!(modes.is_clear());
    }

    #[test]
    fn test_mayhem_satisfies_unsafe_requirement() {
        let mut modes = ContextModes::new();
        modes.push(Mode::Mayhem);
        assert!(modes.in_unsafe_region());
        assert!(modes.require(ModeRequirement::DangerOrMayhem).is_ok());
    }

    #[test]
    fn test_when_guard() {
        let mut modes = ContextModes::new();
        assert!(modes.require(ModeRequirement::OutsideWhenGuard).is_ok());
        modes.push(Mode::WhenGuard);
        assert_eq!(
            modes.require(ModeRequirement::OutsideWhenGuard),
            Err(ModeViolation {
                requirement: ModeRequirement::OutsideWhenGuard
            })
        );
        modes.pop(Mode::WhenGuard);
        assert!(modes.is_clear());
    }
}
