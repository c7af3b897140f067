//! Builder for constructing state machines.

use crate::builder::error::{BuildError, ModelViolation};
use crate::builder::transition::TransitionBuilder;
use crate::builder::validate::validate_model;
use crate::core::{ExtendedState, Payload, State, StateId, Transition};
use crate::machine::{
    HandlerLookup, MachineParts, StateMachine, TaskExecutor, ThreadTaskExecutor,
};
use std::sync::Arc;
use stillwater::validation::Validation;
use uuid::Uuid;

/// Builder for constructing state machines with a fluent API.
///
/// The model is validated as a whole on [`build`](Self::build); every
/// defect found is reported in a single [`BuildError::InvalidModel`].
pub struct StateMachineBuilder<S: StateId, E: Payload> {
    id: Option<String>,
    states: Vec<State<S, E>>,
    transitions: Vec<Transition<S, E>>,
    initial: Option<S>,
    extended_state: ExtendedState,
    handlers: Option<Arc<dyn HandlerLookup<S, E>>>,
    executor: Option<Arc<dyn TaskExecutor>>,
}

impl<S: StateId, E: Payload> StateMachineBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            id: None,
            states: Vec::new(),
            transitions: Vec::new(),
            initial: None,
            extended_state: ExtendedState::new(),
            handlers: None,
            executor: None,
        }
    }

    /// Set the machine id. Defaults to a random UUID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn state(mut self, state: State<S, E>) -> Self {
        self.states.push(state);
        self
    }

    pub fn states(mut self, states: Vec<State<S, E>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Share an existing extended state with the machine.
    pub fn extended_state(mut self, extended_state: ExtendedState) -> Self {
        self.extended_state = extended_state;
        self
    }

    /// Handlers invoked on every state change between two states.
    pub fn handlers<H>(mut self, handlers: H) -> Self
    where
        H: HandlerLookup<S, E> + 'static,
    {
        self.handlers = Some(Arc::new(handlers));
        self
    }

    /// Executor running the event worker. Defaults to [`ThreadTaskExecutor`].
    pub fn executor<X>(mut self, executor: X) -> Self
    where
        X: TaskExecutor + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing or the model is invalid.
    pub fn build(self) -> Result<StateMachine<S, E>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if let Validation::Failure(errors) =
            validate_model(&self.states, &self.transitions, &initial)
        {
            return Err(BuildError::InvalidModel {
                violations: errors.iter().cloned().collect(),
            });
        }

        let states: Vec<Arc<State<S, E>>> = self.states.into_iter().map(Arc::new).collect();
        let initial = states
            .iter()
            .find(|state| state.id() == &initial)
            .cloned()
            .ok_or_else(|| BuildError::InvalidModel {
                violations: vec![ModelViolation::UnknownInitialState {
                    state: format!("{initial:?}"),
                }],
            })?;

        Ok(StateMachine::from_parts(MachineParts {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            states,
            transitions: self.transitions,
            initial,
            extended_state: self.extended_state,
            handlers: self.handlers,
            executor: self
                .executor
                .unwrap_or_else(|| Arc::new(ThreadTaskExecutor::new())),
        }))
    }
}

impl<S: StateId, E: Payload> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
