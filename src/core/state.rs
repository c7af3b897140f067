//! States of a state machine model.
//!
//! A state is identified by a caller-chosen id and carries the actions run
//! when the machine enters or leaves it, plus the set of event payloads it
//! defers until a later state can handle them.

use super::action::Action;
use super::context::StateContext;
use super::event::Payload;
use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Identity of a state.
///
/// Blanket-implemented for every type that is cheap to compare, hash and
/// share between threads, so plain enums and string slices work out of the
/// box.
///
/// # Example
///
/// ```rust
/// use statework::core::StateId;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state_id<S: StateId>(_: &S) {}
/// assert_state_id(&Door::Open);
/// assert_state_id(&"closed");
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StateId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// A node of the state machine model.
///
/// States are assembled with the consuming `with_*` methods and become
/// immutable once handed to a machine. Two states are equal when their ids
/// are equal.
///
/// # Example
///
/// ```rust
/// use statework::core::{Action, State};
///
/// let idle: State<&str, &str> = State::new("idle")
///     .on_entry(|ctx| {
///         ctx.extended_state().set("idle", true).unwrap();
///     })
///     .with_exit_action(Action::new(|_ctx| {}))
///     .defer("resume");
///
/// assert_eq!(idle.id(), &"idle");
/// assert_eq!(idle.entry_actions().len(), 1);
/// assert!(idle.is_deferred(&"resume"));
/// assert!(!idle.is_deferred(&"pause"));
/// ```
#[derive(Clone)]
pub struct State<S, E> {
    id: S,
    entry_actions: Vec<Action<E>>,
    exit_actions: Vec<Action<E>>,
    deferred_events: HashSet<E>,
}

impl<S: StateId, E: Payload> State<S, E> {
    /// Create a state with no actions and no deferred events.
    pub fn new(id: S) -> Self {
        Self {
            id,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            deferred_events: HashSet::new(),
        }
    }

    /// Append an action run every time the machine enters this state.
    pub fn with_entry_action(mut self, action: Action<E>) -> Self {
        self.entry_actions.push(action);
        self
    }

    /// Append an entry action from a closure.
    pub fn on_entry<F>(self, action: F) -> Self
    where
        F: Fn(&StateContext<E>) + Send + Sync + 'static,
    {
        self.with_entry_action(Action::new(action))
    }

    /// Append an action run every time the machine leaves this state.
    pub fn with_exit_action(mut self, action: Action<E>) -> Self {
        self.exit_actions.push(action);
        self
    }

    /// Append an exit action from a closure.
    pub fn on_exit<F>(self, action: F) -> Self
    where
        F: Fn(&StateContext<E>) + Send + Sync + 'static,
    {
        self.with_exit_action(Action::new(action))
    }

    /// Declare an event payload this state holds back instead of dropping.
    pub fn defer(mut self, event: E) -> Self {
        self.deferred_events.insert(event);
        self
    }

    /// Declare several deferrable payloads at once.
    pub fn defer_all<I>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        self.deferred_events.extend(events);
        self
    }

    pub fn id(&self) -> &S {
        &self.id
    }

    /// Entry actions in declaration order.
    pub fn entry_actions(&self) -> &[Action<E>] {
        &self.entry_actions
    }

    /// Exit actions in declaration order.
    pub fn exit_actions(&self) -> &[Action<E>] {
        &self.exit_actions
    }

    pub fn deferred_events(&self) -> &HashSet<E> {
        &self.deferred_events
    }

    /// Check whether this state defers the given payload.
    pub fn is_deferred(&self, event: &E) -> bool {
        self.deferred_events.contains(event)
    }
}

impl<S: PartialEq, E> PartialEq for State<S, E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: Eq, E> Eq for State<S, E> {}

impl<S: Debug, E: Debug> Debug for State<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("entry_actions", &self.entry_actions.len())
            .field("exit_actions", &self.exit_actions.len())
            .field("deferred_events", &self.deferred_events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Start,
        Pause,
        Resume,
    }

    #[test]
    fn new_state_is_bare() {
        let state: State<TestState, TestEvent> = State::new(TestState::Initial);

        assert_eq!(state.id(), &TestState::Initial);
        assert!(state.entry_actions().is_empty());
        assert!(state.exit_actions().is_empty());
        assert!(state.deferred_events().is_empty());
    }

    #[test]
    fn actions_keep_declaration_order() {
        let state: State<TestState, TestEvent> = State::new(TestState::Initial)
            .on_entry(|ctx| {
                ctx.extended_state().set("order", vec!["first"]).unwrap();
            })
            .on_entry(|ctx| {
                let mut order: Vec<String> = ctx.extended_state().get("order").unwrap();
                order.push("second".to_string());
                ctx.extended_state().set("order", order).unwrap();
            })
            .on_exit(|_ctx| {});

        assert_eq!(state.entry_actions().len(), 2);
        assert_eq!(state.exit_actions().len(), 1);

        let context = StateContext::detached();
        for action in state.entry_actions() {
            action.execute(&context);
        }
        let order: Vec<String> = context.extended_state().get("order").unwrap();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn deferred_events_are_tracked() {
        let state: State<TestState, TestEvent> = State::new(TestState::Processing)
            .defer(TestEvent::Pause)
            .defer_all([TestEvent::Resume, TestEvent::Pause]);

        assert_eq!(state.deferred_events().len(), 2);
        assert!(state.is_deferred(&TestEvent::Pause));
        assert!(state.is_deferred(&TestEvent::Resume));
        assert!(!state.is_deferred(&TestEvent::Start));
    }

    #[test]
    fn equality_uses_id_only() {
        let bare: State<TestState, TestEvent> = State::new(TestState::Initial);
        let decorated = State::new(TestState::Initial)
            .defer(TestEvent::Pause)
            .on_entry(|_ctx| {});
        let other = State::new(TestState::Processing);

        assert_eq!(bare, decorated);
        assert_ne!(bare, other);
    }
}
