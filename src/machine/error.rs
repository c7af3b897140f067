//! Runtime errors of a state machine.

use thiserror::Error;

/// Errors returned by machine lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("State machine '{machine}' has already been started")]
    AlreadyStarted { machine: String },
}
