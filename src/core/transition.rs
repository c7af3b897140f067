//! Transitions between states.

use super::action::Action;
use super::context::StateContext;
use super::event::Payload;
use super::guard::Guard;
use super::state::StateId;
use super::trigger::Trigger;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// How a transition affects the current state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Leaves the source (exit actions) and enters the target (entry actions).
    #[default]
    External,

    /// Runs the transition actions only; the current state does not change.
    Internal,

    /// Reserved; currently processed like `External`.
    Local,
}

/// An edge of the state machine model.
///
/// A transition without a trigger is taken automatically right after its
/// source state has been entered.
pub struct Transition<S, E> {
    pub(crate) source: S,
    pub(crate) target: S,
    pub(crate) kind: TransitionKind,
    pub(crate) trigger: Option<Trigger<E>>,
    pub(crate) guard: Option<Guard<E>>,
    pub(crate) actions: Vec<Action<E>>,
}

impl<S: StateId, E: Payload> Transition<S, E> {
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &S {
        &self.target
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn trigger(&self) -> Option<&Trigger<E>> {
        self.trigger.as_ref()
    }

    pub fn guard(&self) -> Option<&Guard<E>> {
        self.guard.as_ref()
    }

    pub fn actions(&self) -> &[Action<E>] {
        &self.actions
    }

    /// Check whether this transition fires automatically.
    pub fn is_triggerless(&self) -> bool {
        self.trigger.is_none()
    }

    /// Check whether the trigger fires on the given payload.
    ///
    /// Triggerless transitions never match an event.
    pub fn matches(&self, event: &E) -> bool {
        self.trigger.as_ref().is_some_and(|t| t.evaluate(event))
    }

    /// Accept step: evaluate the guard and, if it passes, run the
    /// transition actions in order.
    ///
    /// Returns whether the transition was accepted.
    pub fn transit(&self, context: &StateContext<E>) -> bool {
        if !self.guard.as_ref().is_none_or(|g| g.check(context)) {
            return false;
        }
        for action in &self.actions {
            action.execute(context);
        }
        true
    }
}

impl<S: Clone, E> Clone for Transition<S, E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            kind: self.kind,
            trigger: self.trigger.clone(),
            guard: self.guard.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<S: Debug, E> Debug for Transition<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("triggered", &self.trigger.is_some())
            .field("guarded", &self.guard.is_some())
            .field("actions", &self.actions.len())
            .finish()
    }
}
