//! Thread-safe FIFO of submitted events.

use crate::core::{Message, Payload};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Events waiting for the worker, in submission order.
///
/// Any number of producers may push concurrently; only the active worker
/// pops.
#[derive(Debug)]
pub(crate) struct EventQueue<E> {
    events: Mutex<VecDeque<Message<E>>>,
}

impl<E: Payload> EventQueue<E> {
    pub(crate) fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn push(&self, message: Message<E>) {
        self.events.lock().push_back(message);
    }

    pub(crate) fn pop(&self) -> Option<Message<E>> {
        self.events.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}
