//! Build errors for state machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition source state not specified. Call .source(state)")]
    MissingSource,

    #[error("Transition target state not specified. Call .target(state)")]
    MissingTarget,

    #[error("Invalid state machine model: {}", describe(.violations))]
    InvalidModel { violations: Vec<ModelViolation> },
}

impl BuildError {
    /// Model violations carried by this error, empty for builder misuse.
    pub fn violations(&self) -> &[ModelViolation] {
        match self {
            BuildError::InvalidModel { violations } => violations,
            _ => &[],
        }
    }
}

/// A single defect of a state machine model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelViolation {
    #[error("no states defined")]
    NoStates,

    #[error("no transitions defined")]
    NoTransitions,

    #[error("state {state} is defined more than once")]
    DuplicateState { state: String },

    #[error("initial state {state} is not a defined state")]
    UnknownInitialState { state: String },

    #[error("transition {source_state} -> {target_state} references undefined state {state}")]
    UnknownTransitionState {
        source_state: String,
        target_state: String,
        state: String,
    },

    #[error("internal transition {source_state} -> {target_state} must not change state")]
    InternalTransitionChangesState {
        source_state: String,
        target_state: String,
    },

    #[error("automatic transitions form a cycle: {path}")]
    UnguardedCycle { path: String },
}

fn describe(violations: &[ModelViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
