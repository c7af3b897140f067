//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::core::{
    Action, Guard, Payload, StateContext, StateId, Transition, TransitionKind, Trigger,
};

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use statework::builder::TransitionBuilder;
/// use statework::core::TransitionKind;
///
/// let transition = TransitionBuilder::new()
///     .source("draft")
///     .target("review")
///     .event("submit")
///     .when(|ctx| ctx.headers().contains_key("author"))
///     .action(|ctx| {
///         ctx.extended_state().set("submitted", true).unwrap();
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.kind(), TransitionKind::External);
/// assert!(transition.matches(&"submit"));
/// ```
pub struct TransitionBuilder<S, E> {
    source: Option<S>,
    target: Option<S>,
    kind: TransitionKind,
    trigger: Option<Trigger<E>>,
    guard: Option<Guard<E>>,
    actions: Vec<Action<E>>,
}

impl<S: StateId, E: Payload> TransitionBuilder<S, E> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            source: None,
            target: None,
            kind: TransitionKind::External,
            trigger: None,
            guard: None,
            actions: Vec::new(),
        }
    }

    /// Set the source state (required).
    pub fn source(mut self, state: S) -> Self {
        self.source = Some(state);
        self
    }

    /// Set the target state (required, except for internal transitions).
    pub fn target(mut self, state: S) -> Self {
        self.target = Some(state);
        self
    }

    pub fn kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Fire on payloads equal to `event`.
    pub fn event(self, event: E) -> Self {
        self.trigger(Trigger::event(event))
    }

    /// Fire when `trigger` evaluates to true. Without a trigger the
    /// transition is taken automatically on entering its source.
    pub fn trigger(mut self, trigger: Trigger<E>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn guard(mut self, guard: Guard<E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&StateContext<E>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Append an action run when the transition is accepted.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&StateContext<E>) + Send + Sync + 'static,
    {
        self.actions.push(Action::new(action));
        self
    }

    pub fn with_action(mut self, action: Action<E>) -> Self {
        self.actions.push(action);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        let target = match (self.target, self.kind) {
            (Some(target), _) => target,
            (None, TransitionKind::Internal) => source.clone(),
            (None, _) => return Err(BuildError::MissingTarget),
        };

        Ok(Transition {
            source,
            target,
            kind: self.kind,
            trigger: self.trigger,
            guard: self.guard,
            actions: self.actions,
        })
    }
}

impl<S: StateId, E: Payload> Default for TransitionBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
