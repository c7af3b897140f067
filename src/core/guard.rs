//! Guard predicates deciding whether a matched transition is accepted.
//!
//! A guard is the accept step of a transition: once its trigger matched an
//! event, the guard inspects the event headers and the extended state and
//! decides whether the transition actually fires.

use super::context::StateContext;
use std::fmt;
use std::sync::Arc;

/// Pure predicate over a [`StateContext`].
///
/// Guards must be deterministic for a given context and free of side
/// effects; effects belong in transition actions.
///
/// # Example
///
/// ```rust
/// use statework::core::{ExtendedState, Guard, MessageHeaders, StateContext};
///
/// let has_credit = Guard::new(|ctx: &StateContext<&'static str>| {
///     ctx.extended_state().get::<i64>("credit").unwrap_or(0) > 0
/// });
///
/// let variables = ExtendedState::new();
/// let context = StateContext::new(MessageHeaders::new(), variables.clone());
/// assert!(!has_credit.check(&context));
///
/// variables.set("credit", 10).unwrap();
/// assert!(has_credit.check(&context));
/// ```
pub struct Guard<E> {
    predicate: Arc<dyn Fn(&StateContext<E>) -> bool + Send + Sync>,
}

impl<E> Guard<E> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&StateContext<E>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against a context.
    pub fn check(&self, context: &StateContext<E>) -> bool {
        (self.predicate)(context)
    }
}

impl<E> Clone for Guard<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for Guard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExtendedState, MessageHeaders};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Submit,
    }

    fn context_with(key: &str, value: bool) -> StateContext<TestEvent> {
        let variables = ExtendedState::new();
        variables.set(key, value).unwrap();
        StateContext::new(MessageHeaders::new(), variables)
    }

    #[test]
    fn guard_reads_extended_state() {
        let guard = Guard::new(|ctx: &StateContext<TestEvent>| {
            ctx.extended_state().get::<bool>("approved").unwrap_or(false)
        });

        assert!(guard.check(&context_with("approved", true)));
        assert!(!guard.check(&context_with("approved", false)));
        assert!(!guard.check(&context_with("other", true)));
    }

    #[test]
    fn guard_reads_headers() {
        let guard = Guard::new(|ctx: &StateContext<TestEvent>| ctx.headers().contains_key("token"));

        let mut headers = MessageHeaders::new();
        assert!(!guard.check(&StateContext::new(headers.clone(), ExtendedState::new())));

        headers.insert("token", "secret");
        assert!(guard.check(&StateContext::new(headers, ExtendedState::new())));
    }

    #[test]
    fn guard_is_deterministic() {
        let context = context_with("approved", true);
        let guard = Guard::new(|ctx: &StateContext<TestEvent>| {
            ctx.extended_state().get::<bool>("approved").unwrap_or(false)
        });

        assert_eq!(guard.check(&context), guard.check(&context));
        assert_eq!(guard.clone().check(&context), guard.check(&context));
    }

    #[test]
    fn guard_ignores_missing_payload() {
        let guard = Guard::new(|ctx: &StateContext<TestEvent>| {
            ctx.payload().map_or(true, |event| *event == TestEvent::Submit)
        });

        assert!(guard.check(&StateContext::detached()));
    }
}
