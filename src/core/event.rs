//! Events and the metadata attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use uuid::Uuid;

/// Event payload carried by a [`Message`].
///
/// Payload identity (`Eq + Hash`) is what triggers match against and what
/// states list as deferrable.
pub trait Payload: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Metadata attached to an event at submission time.
///
/// Every header set has a unique id and a creation timestamp; the remaining
/// values are free-form JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageHeaders {
    id: Uuid,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    values: HashMap<String, Value>,
}

impl MessageHeaders {
    /// Create headers with a fresh id and the current time.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            values: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set a header, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of free-form header values (id and timestamp excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for MessageHeaders {
    fn default() -> Self {
        Self::new()
    }
}

/// An event payload together with its headers.
///
/// # Example
///
/// ```rust
/// use statework::core::Message;
///
/// let message = Message::new("deposit").with_header("amount", 42);
///
/// assert_eq!(message.payload(), &"deposit");
/// assert_eq!(message.headers().get("amount"), Some(&serde_json::json!(42)));
/// ```
#[derive(Clone, Debug)]
pub struct Message<E> {
    payload: E,
    headers: MessageHeaders,
}

impl<E: Payload> Message<E> {
    pub fn new(payload: E) -> Self {
        Self {
            payload,
            headers: MessageHeaders::new(),
        }
    }

    /// Attach a header value.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    /// Unique id of this message, taken from its headers.
    pub fn id(&self) -> Uuid {
        self.headers.id
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    pub(crate) fn headers_mut(&mut self) -> &mut MessageHeaders {
        &mut self.headers
    }
}

impl<E: Payload> From<E> for Message<E> {
    fn from(payload: E) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_start_empty_with_identity() {
        let headers = MessageHeaders::new();

        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
        assert_ne!(headers.id(), MessageHeaders::new().id());
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut headers = MessageHeaders::new();

        assert_eq!(headers.insert("retries", 1), None);
        assert_eq!(headers.insert("retries", 2), Some(json!(1)));
        assert_eq!(headers.get("retries"), Some(&json!(2)));
        assert!(headers.contains_key("retries"));
    }

    #[test]
    fn message_from_payload_gets_fresh_headers() {
        let first: Message<&str> = "go".into();
        let second: Message<&str> = "go".into();

        assert_eq!(first.payload(), second.payload());
        assert_ne!(first.id(), second.id());
        assert!(first.headers().is_empty());
    }

    #[test]
    fn with_header_accumulates_values() {
        let message = Message::new(7u32)
            .with_header("source", "sensor")
            .with_header("priority", 3);

        assert_eq!(message.headers().len(), 2);
        assert_eq!(message.headers().get("source"), Some(&json!("sensor")));
        assert_eq!(message.into_payload(), 7);
    }

    #[test]
    fn headers_serialize_correctly() {
        let mut headers = MessageHeaders::new();
        headers.insert("trace", "abc");

        let json = serde_json::to_string(&headers).unwrap();
        let deserialized: MessageHeaders = serde_json::from_str(&json).unwrap();

        assert_eq!(headers, deserialized);
    }
}
