//! Core model types of a state machine.
//!
//! This module contains the immutable description a machine runs on:
//! - States with entry/exit actions and deferrable events
//! - Transitions with triggers, guards and actions
//! - Events with their headers
//! - The extended state and the context handed to actions and guards

mod action;
mod context;
mod event;
mod guard;
mod state;
mod transition;
mod trigger;

pub(crate) use context::EventSink;

pub use action::Action;
pub use context::{ExtendedState, StateContext};
pub use event::{Message, MessageHeaders, Payload};
pub use guard::Guard;
pub use state::{State, StateId};
pub use transition::{Transition, TransitionKind};
pub use trigger::Trigger;
