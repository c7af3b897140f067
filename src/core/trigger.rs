//! Triggers deciding which events a transition responds to.

use super::event::Payload;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Pure predicate over an event payload.
///
/// # Example
///
/// ```rust
/// use statework::core::Trigger;
///
/// let on_go = Trigger::event("go");
/// assert!(on_go.evaluate(&"go"));
/// assert!(!on_go.evaluate(&"stop"));
///
/// let long_words = Trigger::new(|word: &&'static str| word.len() > 3);
/// assert!(long_words.evaluate(&"ready"));
/// ```
pub struct Trigger<E> {
    predicate: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E: Payload> Trigger<E> {
    /// Create a trigger from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Trigger {
            predicate: Arc::new(predicate),
        }
    }

    /// Trigger firing on payloads equal to `expected`.
    pub fn event(expected: E) -> Self {
        Self::new(move |event| *event == expected)
    }

    /// Trigger firing on any of the given payloads.
    pub fn any_of<I>(events: I) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        let events: HashSet<E> = events.into_iter().collect();
        Self::new(move |event| events.contains(event))
    }

    pub fn evaluate(&self, event: &E) -> bool {
        (self.predicate)(event)
    }
}

impl<E> Clone for Trigger<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for Trigger<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trigger")
    }
}
