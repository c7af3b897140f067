//! Handlers bound to specific (source, target) state pairs.
//!
//! Handlers are assembled explicitly by the embedding application into a
//! [`HandlerRegistry`] (or any other [`HandlerLookup`]) and handed to the
//! machine at construction. On every committed transition the machine looks
//! up the handlers for the pair and runs them in the order returned.

use crate::core::{Payload, StateContext, StateId};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Order assigned to handlers that do not specify one; runs last.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// A callback run when the machine moves between two specific states.
///
/// Handlers with a lower `order` run first.
pub struct TransitionHandler<E> {
    order: i32,
    handle: Arc<dyn Fn(&StateContext<E>) -> Value + Send + Sync>,
}

impl<E> TransitionHandler<E> {
    pub fn new<F>(handle: F) -> Self
    where
        F: Fn(&StateContext<E>) -> Value + Send + Sync + 'static,
    {
        Self {
            order: LOWEST_PRECEDENCE,
            handle: Arc::new(handle),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn handle(&self, context: &StateContext<E>) -> Value {
        (self.handle)(context)
    }
}

impl<E> Clone for TransitionHandler<E> {
    fn clone(&self) -> Self {
        Self {
            order: self.order,
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<E> fmt::Debug for TransitionHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandler")
            .field("order", &self.order)
            .finish()
    }
}

/// Source of handlers for a (source, target) pair.
pub trait HandlerLookup<S, E>: Send + Sync {
    /// Handlers to run, already in execution order.
    fn handlers_for(&self, source: &S, target: &S) -> Vec<TransitionHandler<E>>;
}

/// Explicit handler registry keyed by (source, target).
///
/// # Example
///
/// ```rust
/// use statework::machine::{HandlerLookup, HandlerRegistry, TransitionHandler};
/// use serde_json::json;
///
/// let registry: HandlerRegistry<&str, &str> = HandlerRegistry::new()
///     .with_handler("idle", "busy", TransitionHandler::new(|_ctx| json!("audit")).with_order(10))
///     .with_handler("idle", "busy", TransitionHandler::new(|_ctx| json!("metrics")).with_order(1));
///
/// let orders: Vec<i32> = registry
///     .handlers_for(&"idle", &"busy")
///     .iter()
///     .map(|h| h.order())
///     .collect();
/// assert_eq!(orders, vec![1, 10]);
/// assert!(registry.handlers_for(&"busy", &"idle").is_empty());
/// ```
pub struct HandlerRegistry<S, E> {
    handlers: HashMap<(S, S), Vec<TransitionHandler<E>>>,
}

impl<S: StateId, E: Payload> HandlerRegistry<S, E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Handlers with equal order keep registration order.
    pub fn register(&mut self, source: S, target: S, handler: TransitionHandler<E>) {
        let handlers = self.handlers.entry((source, target)).or_default();
        handlers.push(handler);
        handlers.sort_by_key(TransitionHandler::order);
    }

    pub fn with_handler(mut self, source: S, target: S, handler: TransitionHandler<E>) -> Self {
        self.register(source, target, handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S: StateId, E: Payload> Default for HandlerRegistry<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId, E: Payload> HandlerLookup<S, E> for HandlerRegistry<S, E> {
    fn handlers_for(&self, source: &S, target: &S) -> Vec<TransitionHandler<E>> {
        self.handlers
            .get(&(source.clone(), target.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        Busy,
    }

    #[test]
    fn registry_sorts_by_order_stably() {
        let mut registry: HandlerRegistry<TestState, u8> = HandlerRegistry::new();
        registry.register(
            TestState::Idle,
            TestState::Busy,
            TransitionHandler::new(|_| json!("late")),
        );
        registry.register(
            TestState::Idle,
            TestState::Busy,
            TransitionHandler::new(|_| json!("first")).with_order(-5),
        );
        registry.register(
            TestState::Idle,
            TestState::Busy,
            TransitionHandler::new(|_| json!("second")).with_order(-5),
        );

        let context = StateContext::detached();
        let results: Vec<Value> = registry
            .handlers_for(&TestState::Idle, &TestState::Busy)
            .iter()
            .map(|h| h.handle(&context))
            .collect();

        assert_eq!(results, vec![json!("first"), json!("second"), json!("late")]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn lookup_is_directional() {
        let registry: HandlerRegistry<TestState, u8> = HandlerRegistry::new().with_handler(
            TestState::Idle,
            TestState::Busy,
            TransitionHandler::new(|_| Value::Null),
        );

        assert_eq!(registry.handlers_for(&TestState::Idle, &TestState::Busy).len(), 1);
        assert!(registry
            .handlers_for(&TestState::Busy, &TestState::Idle)
            .is_empty());
    }

    #[test]
    fn default_order_is_lowest_precedence() {
        let handler: TransitionHandler<u8> = TransitionHandler::new(|_| Value::Null);

        assert_eq!(handler.order(), LOWEST_PRECEDENCE);
        assert!(HandlerRegistry::<TestState, u8>::default().is_empty());
    }
}
