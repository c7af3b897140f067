//! Holding area for events the current state cannot act on yet.

use crate::core::{Message, Payload};
use uuid::Uuid;

/// Deferred events in first-deferred-first-retried order.
#[derive(Debug)]
pub(crate) struct DeferList<E> {
    events: Vec<Message<E>>,
}

impl<E: Payload> DeferList<E> {
    pub(crate) fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn defer(&mut self, message: Message<E>) {
        self.events.push(message);
    }

    /// Remove a deferred event by message id.
    pub(crate) fn remove(&mut self, id: Uuid) -> Option<Message<E>> {
        let position = self.events.iter().position(|m| m.id() == id)?;
        Some(self.events.remove(position))
    }

    /// Copy of the deferred events in retry order.
    pub(crate) fn snapshot(&self) -> Vec<Message<E>> {
        self.events.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_preserves_defer_order() {
        let mut list = DeferList::new();
        list.defer(Message::new("a"));
        list.defer(Message::new("b"));
        list.defer(Message::new("a"));

        let payloads: Vec<_> = list.snapshot().into_iter().map(Message::into_payload).collect();
        assert_eq!(payloads, vec!["a", "b", "a"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn remove_targets_single_message() {
        let mut list = DeferList::new();
        let first = Message::new("same");
        let second = Message::new("same");
        let second_id = second.id();
        list.defer(first.clone());
        list.defer(second);

        let removed = list.remove(second_id).unwrap();
        assert_eq!(removed.id(), second_id);
        assert_eq!(list.len(), 1);
        assert_eq!(list.snapshot()[0].id(), first.id());

        assert!(list.remove(second_id).is_none());
        assert!(list.remove(first.id()).is_some());
        assert!(list.is_empty());
    }
}
