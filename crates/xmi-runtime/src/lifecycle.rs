//! Kernel lifecycle state machine
//!
//! `Uninitialized` → `initialize` → `Initialized` → `finalize` →
//! `Uninitialized`. Violations are rejected before any native call.
//! Stepping and solve calls are not pre-checked; the kernel is
//! authoritative for those.

use crate::error::{XmiError, XmiResult};

/// Lifecycle state of a kernel instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Uninitialized,
    Initialized,
}

impl State {
    /// Check that `initialize` is allowed
    pub fn check_initialize(self) -> XmiResult<()> {
        match self {
            State::Uninitialized => Ok(()),
            State::Initialized => Err(XmiError::State(
                "The library is already initialized".to_string(),
            )),
        }
    }

    /// Check that `finalize` is allowed
    pub fn check_finalize(self) -> XmiResult<()> {
        match self {
            State::Initialized => Ok(()),
            State::Uninitialized => Err(XmiError::State(
                "The library is not initialized yet".to_string(),
            )),
        }
    }

    /// Whether the kernel is initialized
    pub fn is_initialized(self) -> bool {
        self == State::Initialized
    }
}
