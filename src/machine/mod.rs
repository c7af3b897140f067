//! Runtime that drives a state machine model.
//!
//! Events are accepted from any thread and queued. A single worker at a time
//! drains the queue, executes the matching transitions with their exit, entry
//! and handler side effects, follows triggerless transitions, and finally
//! retries deferred events against the state the machine ended up in.

mod defer;
mod error;
mod executor;
mod handler;
mod listener;
mod queue;
mod scheduler;

pub use error::MachineError;
pub use executor::{SyncTaskExecutor, Task, TaskExecutor, ThreadTaskExecutor, TokioTaskExecutor};
pub use handler::{HandlerLookup, HandlerRegistry, TransitionHandler, LOWEST_PRECEDENCE};
pub use listener::StateMachineListener;

use crate::builder::{BuildError, StateMachineBuilder};
use crate::core::{
    EventSink, ExtendedState, Message, Payload, State, StateContext, StateId, Transition,
    TransitionKind,
};
use defer::DeferList;
use listener::{CompositeListener, StateChangedFn};
use parking_lot::{Mutex, RwLock};
use queue::EventQueue;
use scheduler::{PendingToken, Scheduler, WorkerToken};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, trace, warn};

/// Header stamped on every submitted event with the id of the receiving machine.
pub const MACHINE_HEADER: &str = "machine";

/// Validated model and collaborators a machine is assembled from.
pub(crate) struct MachineParts<S, E> {
    pub(crate) id: String,
    pub(crate) states: Vec<Arc<State<S, E>>>,
    pub(crate) transitions: Vec<Transition<S, E>>,
    pub(crate) initial: Arc<State<S, E>>,
    pub(crate) extended_state: ExtendedState,
    pub(crate) handlers: Option<Arc<dyn HandlerLookup<S, E>>>,
    pub(crate) executor: Arc<dyn TaskExecutor>,
}

/// Outcome of matching one event against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// A trigger matched and the guard accepted.
    Accepted,
    /// A trigger matched but the guard rejected; the event is resolved.
    Declined,
    /// No trigger matched and the current state defers the payload.
    Deferred,
    /// Nothing applies; the event is dropped.
    Unmatched,
}

struct Inner<S: StateId, E: Payload> {
    id: String,
    states: Vec<Arc<State<S, E>>>,
    index: HashMap<S, Arc<State<S, E>>>,
    transitions: Vec<Transition<S, E>>,
    initial: Arc<State<S, E>>,
    extended_state: ExtendedState,
    queue: EventQueue<E>,
    defer_list: Mutex<DeferList<E>>,
    current: RwLock<Option<Arc<State<S, E>>>>,
    listeners: CompositeListener<S, E>,
    handlers: Option<Arc<dyn HandlerLookup<S, E>>>,
    scheduler: Arc<Scheduler>,
    started: AtomicBool,
    weak_self: Weak<Inner<S, E>>,
}

/// An event-driven state machine.
///
/// Cloning yields another handle to the same machine.
///
/// # Example
///
/// ```rust
/// use statework::builder::{external_transition, unguarded_transition};
/// use statework::core::State;
/// use statework::machine::{StateMachine, SyncTaskExecutor};
///
/// let machine = StateMachine::builder()
///     .state(State::new("locked"))
///     .state(State::new("unlocking"))
///     .state(State::new("open"))
///     .initial("locked")
///     .add_transition(external_transition("locked", "unlocking", "key"))
///     .add_transition(unguarded_transition("unlocking", "open"))
///     .executor(SyncTaskExecutor)
///     .build()
///     .unwrap();
///
/// machine.start().unwrap();
/// assert_eq!(machine.state_id(), Some("locked"));
///
/// machine.send_event("key");
/// assert_eq!(machine.state_id(), Some("open"));
/// ```
pub struct StateMachine<S: StateId, E: Payload> {
    inner: Arc<Inner<S, E>>,
}

impl<S: StateId, E: Payload> StateMachine<S, E> {
    /// Build a machine from a complete model.
    ///
    /// Fails if the model is empty, references unknown states or contains a
    /// cycle of unguarded automatic transitions.
    pub fn new(
        states: Vec<State<S, E>>,
        transitions: Vec<Transition<S, E>>,
        initial: S,
    ) -> Result<Self, BuildError> {
        Self::builder()
            .states(states)
            .transitions(transitions)
            .initial(initial)
            .build()
    }

    /// Build a machine sharing an existing extended state.
    pub fn with_extended_state(
        states: Vec<State<S, E>>,
        transitions: Vec<Transition<S, E>>,
        initial: S,
        extended_state: ExtendedState,
    ) -> Result<Self, BuildError> {
        Self::builder()
            .states(states)
            .transitions(transitions)
            .initial(initial)
            .extended_state(extended_state)
            .build()
    }

    pub fn builder() -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new()
    }

    pub(crate) fn from_parts(parts: MachineParts<S, E>) -> Self {
        let index: HashMap<S, Arc<State<S, E>>> = parts
            .states
            .iter()
            .map(|state| (state.id().clone(), Arc::clone(state)))
            .collect();

        let inner = Arc::new_cyclic(|weak_self| Inner {
            id: parts.id,
            states: parts.states,
            index,
            transitions: parts.transitions,
            initial: parts.initial,
            extended_state: parts.extended_state,
            queue: EventQueue::new(),
            defer_list: Mutex::new(DeferList::new()),
            current: RwLock::new(None),
            listeners: CompositeListener::new(),
            handlers: parts.handlers,
            scheduler: Arc::new(Scheduler::new(parts.executor)),
            started: AtomicBool::new(false),
            weak_self: weak_self.clone(),
        });

        Self { inner }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Start the machine: enter the initial state (following any automatic
    /// transitions from it) on the calling thread, then begin draining
    /// queued events on the executor.
    ///
    /// On return the machine is in its initial state, or wherever the
    /// automatic transitions from it led.
    ///
    /// A machine starts once; later calls fail with
    /// [`MachineError::AlreadyStarted`] and change nothing.
    pub fn start(&self) -> Result<(), MachineError> {
        let inner = &self.inner;
        // No worker runs before `started` is set, so only a concurrent
        // start can hold the token here.
        if inner.started.load(Ordering::SeqCst) || !inner.scheduler.try_acquire() {
            return Err(inner.already_started());
        }
        let token = PendingToken::held(Arc::clone(&inner.scheduler));
        if inner
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            token.release();
            inner.schedule();
            return Err(inner.already_started());
        }

        info!(machine = %inner.id, initial = ?inner.initial.id(), "starting state machine");
        inner.switch_to_state(Arc::clone(&inner.initial), None);
        inner.dispatch_worker(token);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Submit an event. Never fails.
    ///
    /// Processing happens on the configured [`TaskExecutor`]; with anything
    /// but [`SyncTaskExecutor`] this returns before the event is handled.
    /// Events sent before [`start`](Self::start) are kept until the machine
    /// starts.
    pub fn send_event(&self, event: impl Into<Message<E>>) {
        self.inner.enqueue(event.into());
    }

    /// Current state; `None` until the initial state has been entered.
    pub fn state(&self) -> Option<Arc<State<S, E>>> {
        self.inner.current_state()
    }

    pub fn state_id(&self) -> Option<S> {
        self.inner.current_state().map(|state| state.id().clone())
    }

    pub fn initial_state(&self) -> Arc<State<S, E>> {
        Arc::clone(&self.inner.initial)
    }

    /// Snapshot of the model's states in declaration order.
    pub fn states(&self) -> Vec<Arc<State<S, E>>> {
        self.inner.states.clone()
    }

    pub fn transitions(&self) -> &[Transition<S, E>] {
        &self.inner.transitions
    }

    pub fn extended_state(&self) -> &ExtendedState {
        &self.inner.extended_state
    }

    /// Snapshot of the deferred events in retry order.
    pub fn deferred_events(&self) -> Vec<Message<E>> {
        self.inner.defer_list.lock().snapshot()
    }

    /// Number of submitted events not yet taken by the worker.
    pub fn pending_events(&self) -> usize {
        self.inner.queue.len()
    }

    /// Check that no worker is running and no event is waiting.
    pub fn is_idle(&self) -> bool {
        !self.inner.scheduler.is_active() && self.inner.queue.is_empty()
    }

    pub fn add_state_listener<L>(&self, listener: L)
    where
        L: StateMachineListener<S, E> + 'static,
    {
        self.inner.listeners.register(Arc::new(listener));
    }

    /// Register a closure called on every committed state change.
    pub fn on_state_changed<F>(&self, listener: F)
    where
        F: Fn(Option<&State<S, E>>, &State<S, E>) + Send + Sync + 'static,
    {
        self.add_state_listener(StateChangedFn(listener));
    }
}

impl<S: StateId, E: Payload> Clone for StateMachine<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StateId, E: Payload> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.inner.id)
            .field("state", &self.state_id())
            .field("started", &self.is_started())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl<S: StateId, E: Payload> EventSink<E> for Inner<S, E> {
    fn submit(&self, message: Message<E>) {
        self.enqueue(message);
    }
}

impl<S: StateId, E: Payload> Inner<S, E> {
    fn enqueue(&self, mut message: Message<E>) {
        message.headers_mut().insert(MACHINE_HEADER, self.id.clone());
        debug!(machine = %self.id, event = ?message.payload(), "queue event");
        self.queue.push(message);
        self.schedule();
    }

    fn already_started(&self) -> MachineError {
        warn!(machine = %self.id, "start requested on a started machine");
        MachineError::AlreadyStarted {
            machine: self.id.clone(),
        }
    }

    /// Start a worker unless the machine is not started or one is running.
    fn schedule(&self) {
        if !self.started.load(Ordering::SeqCst) || !self.scheduler.try_acquire() {
            return;
        }
        self.dispatch_worker(PendingToken::held(Arc::clone(&self.scheduler)));
    }

    /// Hand an acquired token to a worker pass on the executor.
    ///
    /// Nothing is dispatched when no event is waiting; events queued while
    /// the token was held are picked up after it is released.
    fn dispatch_worker(&self, mut token: PendingToken) {
        while self.queue.is_empty() {
            token.release();
            if self.queue.is_empty() || !self.scheduler.try_acquire() {
                return;
            }
            token = PendingToken::held(Arc::clone(&self.scheduler));
        }
        let Some(inner) = self.weak_self.upgrade() else {
            return;
        };
        self.scheduler.execute(Box::new(move || {
            token.claim();
            inner.run_worker();
        }));
    }

    fn run_worker(&self) {
        loop {
            {
                let _token = WorkerToken::held(&self.scheduler);
                self.process();
            }
            // Events queued between the last drain and the release found the
            // token taken; pick them up here.
            if self.queue.is_empty() || !self.scheduler.try_acquire() {
                break;
            }
        }
    }

    fn process(&self) {
        self.process_event_queue();
        self.process_defer_list();
    }

    fn process_event_queue(&self) {
        debug!(machine = %self.id, pending = self.queue.len(), "process event queue");
        while let Some(message) = self.queue.pop() {
            match self.dispatch(&message, true) {
                Dispatch::Accepted => {}
                Dispatch::Deferred => {
                    info!(machine = %self.id, event = ?message.payload(), "deferring event");
                    self.defer_list.lock().defer(message.clone());
                    self.listeners.event_deferred(&message);
                }
                Dispatch::Declined | Dispatch::Unmatched => {
                    self.listeners.event_not_accepted(&message);
                }
            }
        }
    }

    fn process_defer_list(&self) {
        let deferred = self.defer_list.lock().snapshot();
        if deferred.is_empty() {
            return;
        }
        debug!(machine = %self.id, deferred = deferred.len(), "process defer list");
        for message in deferred {
            match self.dispatch(&message, false) {
                Dispatch::Accepted | Dispatch::Declined => {
                    self.defer_list.lock().remove(message.id());
                }
                Dispatch::Deferred | Dispatch::Unmatched => {}
            }
        }
    }

    /// Match an event against the transitions leaving the current state.
    ///
    /// The first transition, in declaration order, whose trigger fires wins.
    fn dispatch(&self, message: &Message<E>, allow_defer: bool) -> Dispatch {
        let Some(current) = self.current_state() else {
            return Dispatch::Unmatched;
        };

        let matched = self
            .transitions
            .iter()
            .filter(|t| t.source() == current.id())
            .find(|t| t.matches(message.payload()));

        match matched {
            Some(transition) => {
                let context = self.context(Some(message));
                if !transition.transit(&context) {
                    debug!(
                        machine = %self.id,
                        state = ?current.id(),
                        event = ?message.payload(),
                        "transition guard rejected event"
                    );
                    return Dispatch::Declined;
                }
                if transition.kind() != TransitionKind::Internal {
                    match self.state(transition.target()) {
                        Some(target) => self.switch_to_state(target, Some(message)),
                        None => error!(
                            machine = %self.id,
                            target = ?transition.target(),
                            "transition target is not part of the model"
                        ),
                    }
                }
                Dispatch::Accepted
            }
            None if allow_defer && current.is_deferred(message.payload()) => Dispatch::Deferred,
            None => Dispatch::Unmatched,
        }
    }

    /// Move into `target`, then keep following automatic transitions.
    fn switch_to_state(&self, target: Arc<State<S, E>>, message: Option<&Message<E>>) {
        let mut visited = HashSet::new();
        let mut next = Some(target);
        while let Some(target) = next.take() {
            if !visited.insert(target.id().clone()) {
                error!(
                    machine = %self.id,
                    state = ?target.id(),
                    "automatic transitions loop back to a visited state; cascade stopped"
                );
                break;
            }
            self.enter_state(&target, message);
            next = self.cascade_target(&target, message);
        }
    }

    fn enter_state(&self, target: &Arc<State<S, E>>, message: Option<&Message<E>>) {
        let previous = self.current_state();
        info!(
            machine = %self.id,
            from = ?previous.as_ref().map(|s| s.id()),
            to = ?target.id(),
            "moving into state"
        );

        let context = self.context(message);
        if let Some(previous) = previous.as_deref() {
            for action in previous.exit_actions() {
                action.execute(&context);
            }
            self.listeners.state_exited(previous);
        }

        self.listeners.state_changed(previous.as_deref(), target);

        if let Some(previous) = previous.as_deref() {
            self.call_handlers(previous, target, &context);
        }

        *self.current.write() = Some(Arc::clone(target));

        for action in target.entry_actions() {
            action.execute(&context);
        }
        self.listeners.state_entered(target);
    }

    /// Target of the automatic transition leaving `state`, if it fires.
    fn cascade_target(
        &self,
        state: &State<S, E>,
        message: Option<&Message<E>>,
    ) -> Option<Arc<State<S, E>>> {
        let transition = self
            .transitions
            .iter()
            .find(|t| t.source() == state.id() && t.is_triggerless())?;

        let context = self.context(message);
        if !transition.transit(&context) || transition.kind() == TransitionKind::Internal {
            return None;
        }
        self.state(transition.target())
    }

    fn call_handlers(&self, source: &State<S, E>, target: &State<S, E>, context: &StateContext<E>) {
        let Some(lookup) = self.handlers.as_ref() else {
            return;
        };
        let handlers = lookup.handlers_for(source.id(), target.id());
        if handlers.is_empty() {
            return;
        }
        let results: Vec<Value> = handlers.iter().map(|h| h.handle(context)).collect();
        trace!(
            machine = %self.id,
            from = ?source.id(),
            to = ?target.id(),
            results = ?results,
            "transition handlers completed"
        );
    }

    fn context(&self, message: Option<&Message<E>>) -> StateContext<E> {
        let sink: Weak<dyn EventSink<E>> = self.weak_self.clone();
        StateContext::attached(message, self.extended_state.clone(), sink)
    }

    fn current_state(&self) -> Option<Arc<State<S, E>>> {
        self.current.read().clone()
    }

    fn state(&self, id: &S) -> Option<Arc<State<S, E>>> {
        self.index.get(id).cloned()
    }
}
