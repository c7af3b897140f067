//! Observers of committed state changes.

use crate::core::{Message, Payload, State, StateId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Observer notified by the worker as the machine moves between states.
///
/// Only `state_changed` is required; the other hooks default to no-ops.
/// Callbacks run on the worker, so long-running listeners delay event
/// processing.
pub trait StateMachineListener<S: StateId, E: Payload>: Send + Sync {
    /// Called once per committed transition, including cascaded ones.
    /// `from` is `None` for the initial entry.
    fn state_changed(&self, from: Option<&State<S, E>>, to: &State<S, E>);

    /// Called after the entry actions of `state` have run.
    fn state_entered(&self, _state: &State<S, E>) {}

    /// Called after the exit actions of `state` have run.
    fn state_exited(&self, _state: &State<S, E>) {}

    /// Called when an event was dropped or rejected by a guard.
    fn event_not_accepted(&self, _event: &Message<E>) {}

    /// Called when an event was moved to the defer list.
    fn event_deferred(&self, _event: &Message<E>) {}
}

/// Adapts a closure to [`StateMachineListener::state_changed`].
pub(crate) struct StateChangedFn<F>(pub(crate) F);

impl<S, E, F> StateMachineListener<S, E> for StateChangedFn<F>
where
    S: StateId,
    E: Payload,
    F: Fn(Option<&State<S, E>>, &State<S, E>) + Send + Sync,
{
    fn state_changed(&self, from: Option<&State<S, E>>, to: &State<S, E>) {
        (self.0)(from, to)
    }
}

/// Fan-out to every registered listener, in registration order.
pub(crate) struct CompositeListener<S, E> {
    listeners: RwLock<Vec<Arc<dyn StateMachineListener<S, E>>>>,
}

impl<S: StateId, E: Payload> CompositeListener<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn register(&self, listener: Arc<dyn StateMachineListener<S, E>>) {
        self.listeners.write().push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.read().len()
    }

    // Callbacks run outside the lock so listeners may register listeners.
    fn snapshot(&self) -> Vec<Arc<dyn StateMachineListener<S, E>>> {
        self.listeners.read().clone()
    }

    pub(crate) fn state_changed(&self, from: Option<&State<S, E>>, to: &State<S, E>) {
        for listener in self.snapshot() {
            listener.state_changed(from, to);
        }
    }

    pub(crate) fn state_entered(&self, state: &State<S, E>) {
        for listener in self.snapshot() {
            listener.state_entered(state);
        }
    }

    pub(crate) fn state_exited(&self, state: &State<S, E>) {
        for listener in self.snapshot() {
            listener.state_exited(state);
        }
    }

    pub(crate) fn event_not_accepted(&self, event: &Message<E>) {
        for listener in self.snapshot() {
            listener.event_not_accepted(event);
        }
    }

    pub(crate) fn event_deferred(&self, event: &Message<E>) {
        for listener in self.snapshot() {
            listener.event_deferred(event);
        }
    }
}
