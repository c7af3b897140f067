//! Shared extended state and the context handed to actions and guards.

use super::event::{Message, MessageHeaders, Payload};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Mutable key/value blackboard shared by every action and guard of a machine.
///
/// Cloning yields another handle to the same variables.
///
/// # Example
///
/// ```rust
/// use statework::core::ExtendedState;
///
/// let state = ExtendedState::new();
/// let handle = state.clone();
///
/// state.set("attempts", 2).unwrap();
/// assert_eq!(handle.get::<u32>("attempts"), Some(2));
///
/// handle.update("attempts", |v| serde_json::json!(v.and_then(|v| v.as_u64()).unwrap_or(0) + 1));
/// assert_eq!(state.get::<u32>("attempts"), Some(3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ExtendedState {
    variables: Arc<RwLock<HashMap<String, Value>>>,
}

impl ExtendedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a variable, decoding it into `T`.
    ///
    /// Returns `None` when the key is missing or the stored value does not
    /// decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.variables.read().get(key).cloned()?;
        serde_json::from_value(value).ok()
    }

    /// Read the raw JSON value of a variable.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.variables.read().get(key).cloned()
    }

    /// Store a variable, returning the previous raw value if any.
    pub fn set<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<Option<Value>, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.variables.write().insert(key.into(), value))
    }

    /// Replace a variable with the result of `f` applied to its current value.
    ///
    /// The read and the write happen under one lock.
    pub fn update<F>(&self, key: &str, f: F) -> Value
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let mut variables = self.variables.write();
        let next = f(variables.get(key));
        variables.insert(key.to_string(), next.clone());
        next
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.variables.write().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.variables.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.variables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.read().is_empty()
    }

    /// Copy of every variable at this instant.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.variables.read().clone()
    }
}

impl From<HashMap<String, Value>> for ExtendedState {
    fn from(variables: HashMap<String, Value>) -> Self {
        Self {
            variables: Arc::new(RwLock::new(variables)),
        }
    }
}

/// Receiver of events submitted from inside a running action.
pub(crate) trait EventSink<E>: Send + Sync {
    fn submit(&self, message: Message<E>);
}

/// Context handed to every action, guard and transition handler.
///
/// Built from the headers of the event being processed (or empty headers
/// when there is none, as on the initial entry) and the machine's
/// [`ExtendedState`].
pub struct StateContext<E> {
    headers: MessageHeaders,
    payload: Option<E>,
    extended_state: ExtendedState,
    sink: Option<Weak<dyn EventSink<E>>>,
}

impl<E: Payload> StateContext<E> {
    /// Create a context that is not attached to any machine.
    ///
    /// Events sent through a detached context are discarded.
    pub fn new(headers: MessageHeaders, extended_state: ExtendedState) -> Self {
        Self {
            headers,
            payload: None,
            extended_state,
            sink: None,
        }
    }

    /// Detached context with empty headers and a fresh extended state.
    pub fn detached() -> Self {
        Self::new(MessageHeaders::new(), ExtendedState::new())
    }

    pub(crate) fn attached(
        message: Option<&Message<E>>,
        extended_state: ExtendedState,
        sink: Weak<dyn EventSink<E>>,
    ) -> Self {
        let (headers, payload) = match message {
            Some(message) => (message.headers().clone(), Some(message.payload().clone())),
            None => (MessageHeaders::new(), None),
        };
        Self {
            headers,
            payload,
            extended_state,
            sink: Some(sink),
        }
    }

    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    /// Payload of the event being processed, if any.
    pub fn payload(&self) -> Option<&E> {
        self.payload.as_ref()
    }

    pub fn extended_state(&self) -> &ExtendedState {
        &self.extended_state
    }

    /// Submit a new event to the owning machine.
    ///
    /// The event is queued behind everything already submitted and is
    /// processed after the current action returns. Returns `false` when the
    /// context is detached or the machine is gone.
    pub fn send_event(&self, event: impl Into<Message<E>>) -> bool {
        match self.sink.as_ref().and_then(Weak::upgrade) {
            Some(sink) => {
                sink.submit(event.into());
                true
            }
            None => false,
        }
    }
}
