//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and shorthand constructors for the
//! common transition shapes. Models are validated when the machine is built.

pub mod error;
pub mod machine;
pub mod transition;
mod validate;

pub use error::{BuildError, ModelViolation};
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Action, Payload, StateContext, StateId, Transition, TransitionKind, Trigger};

/// Create an external transition fired by a single event.
///
/// # Example
///
/// ```
/// use statework::builder::external_transition;
///
/// let transition = external_transition("idle", "busy", "work");
/// assert!(transition.matches(&"work"));
/// ```
pub fn external_transition<S, E>(source: S, target: S, event: E) -> Transition<S, E>
where
    S: StateId,
    E: Payload,
{
    Transition {
        source,
        target,
        kind: TransitionKind::External,
        trigger: Some(Trigger::event(event)),
        guard: None,
        actions: Vec::new(),
    }
}

/// Create an internal transition: runs its actions on `event` without
/// leaving `state`.
///
/// # Example
///
/// ```
/// use statework::builder::internal_transition;
/// use statework::core::TransitionKind;
///
/// let transition = internal_transition("busy", "tick", |ctx| {
///     ctx.extended_state().update("ticks", |v| {
///         (v.and_then(|v| v.as_u64()).unwrap_or(0) + 1).into()
///     });
/// });
/// assert_eq!(transition.kind(), TransitionKind::Internal);
/// assert_eq!(transition.target(), &"busy");
/// ```
pub fn internal_transition<S, E, F>(state: S, event: E, action: F) -> Transition<S, E>
where
    S: StateId,
    E: Payload,
    F: Fn(&StateContext<E>) + Send + Sync + 'static,
{
    Transition {
        source: state.clone(),
        target: state,
        kind: TransitionKind::Internal,
        trigger: Some(Trigger::event(event)),
        guard: None,
        actions: vec![Action::new(action)],
    }
}

/// Create a triggerless, unguarded transition taken as soon as `source` is
/// entered.
///
/// # Example
///
/// ```
/// use statework::builder::unguarded_transition;
///
/// let transition = unguarded_transition::<_, &str>("submitted", "queued");
/// assert!(transition.is_triggerless());
/// ```
pub fn unguarded_transition<S, E>(source: S, target: S) -> Transition<S, E>
where
    S: StateId,
    E: Payload,
{
    Transition {
        source,
        target,
        kind: TransitionKind::External,
        trigger: None,
        guard: None,
        actions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtendedState;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Start,
        Middle,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Next,
        Other,
    }

    #[test]
    fn external_transition_builds() {
        let transition = external_transition(TestState::Start, TestState::Middle, TestEvent::Next);

        assert_eq!(transition.source(), &TestState::Start);
        assert_eq!(transition.target(), &TestState::Middle);
        assert_eq!(transition.kind(), TransitionKind::External);
        assert!(transition.matches(&TestEvent::Next));
        assert!(!transition.matches(&TestEvent::Other));
    }

    #[test]
    fn internal_transition_runs_action_in_place() {
        let transition = internal_transition(TestState::Middle, TestEvent::Next, |ctx| {
            ctx.extended_state().set("ran", true).unwrap();
        });
        let variables = ExtendedState::new();

        assert!(transition.transit(&StateContext::new(Default::default(), variables.clone())));
        assert_eq!(transition.source(), transition.target());
        assert_eq!(variables.get::<bool>("ran"), Some(true));
    }

    #[test]
    fn unguarded_transition_is_automatic() {
        let transition: Transition<TestState, TestEvent> =
            unguarded_transition(TestState::Start, TestState::Middle);

        assert!(transition.is_triggerless());
        assert!(transition.guard().is_none());
        assert!(transition.transit(&StateContext::detached()));
    }
}
