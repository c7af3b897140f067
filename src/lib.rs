//! Statework: an event-driven finite state machine engine
//!
//! A machine is described once, as states and transitions, and then driven by
//! events submitted from any thread. Events are processed one at a time by a
//! single worker, in submission order.
//!
//! # Core Concepts
//!
//! - **State**: An identifier with entry/exit actions and a set of deferrable events
//! - **Transition**: External, internal or local edges with an optional trigger,
//!   guard and actions. Transitions without a trigger fire automatically when
//!   their source is entered
//! - **Deferral**: Events a state cannot handle yet are kept and retried after
//!   every processing pass
//! - **Listeners and handlers**: Observers of state changes and per-edge callbacks
//!
//! # Example
//!
//! ```rust
//! use statework::builder::{external_transition, unguarded_transition};
//! use statework::core::State;
//! use statework::machine::{StateMachine, SyncTaskExecutor};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Order {
//!     Placed,
//!     Paid,
//!     Shipping,
//! }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Command {
//!     Pay,
//!     Ship,
//! }
//!
//! let machine = StateMachine::builder()
//!     .state(State::new(Order::Placed).defer(Command::Ship))
//!     .state(State::new(Order::Paid))
//!     .state(State::new(Order::Shipping))
//!     .initial(Order::Placed)
//!     .add_transition(external_transition(Order::Placed, Order::Paid, Command::Pay))
//!     .add_transition(external_transition(Order::Paid, Order::Shipping, Command::Ship))
//!     .executor(SyncTaskExecutor)
//!     .build()
//!     .unwrap();
//!
//! let changes = Arc::new(Mutex::new(Vec::new()));
//! let seen = Arc::clone(&changes);
//! machine.on_state_changed(move |_, to| seen.lock().unwrap().push(to.id().clone()));
//!
//! machine.start().unwrap();
//! machine.send_event(Command::Ship);
//! assert_eq!(machine.deferred_events().len(), 1);
//!
//! machine.send_event(Command::Pay);
//! assert_eq!(machine.state_id(), Some(Order::Shipping));
//! assert_eq!(
//!     *changes.lock().unwrap(),
//!     vec![Order::Placed, Order::Paid, Order::Shipping]
//! );
//! ```

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use crate::core::{Message, State, StateContext, Transition, TransitionKind};
pub use crate::machine::{MachineError, StateMachine, StateMachineListener};
