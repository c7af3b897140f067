//! Turnstile State Machine
//!
//! This example demonstrates deferred events and automatic transitions.
//!
//! Key concepts:
//! - A push arriving while locked is deferred, not lost
//! - An automatic transition re-locks the turnstile after each passage
//! - Internal transitions count coins without leaving the state
//! - Synchronous execution for a deterministic walkthrough
//!
//! Run with: cargo run --example turnstile

use statework::builder::{external_transition, internal_transition, unguarded_transition};
use statework::core::State;
use statework::machine::{StateMachine, SyncTaskExecutor};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Turnstile {
    Locked,
    Unlocked,
    Passing,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Input {
    Coin,
    Push,
    Inspect,
}

fn main() {
    println!("=== Turnstile State Machine ===\n");

    let machine = StateMachine::builder()
        .id("turnstile")
        .state(
            State::new(Turnstile::Locked)
                .defer(Input::Push)
                .on_entry(|_| println!("  [locked]")),
        )
        .state(State::new(Turnstile::Unlocked).on_entry(|_| println!("  [unlocked]")))
        .state(State::new(Turnstile::Passing).on_entry(|ctx| {
            let passed = ctx.extended_state().update("passed", |v| {
                (v.and_then(|v| v.as_u64()).unwrap_or(0) + 1).into()
            });
            println!("  [passing] visitor #{passed}");
        }))
        .initial(Turnstile::Locked)
        .add_transition(external_transition(
            Turnstile::Locked,
            Turnstile::Unlocked,
            Input::Coin,
        ))
        .add_transition(external_transition(
            Turnstile::Unlocked,
            Turnstile::Passing,
            Input::Push,
        ))
        .add_transition(unguarded_transition(Turnstile::Passing, Turnstile::Locked))
        .add_transition(internal_transition(Turnstile::Locked, Input::Inspect, |ctx| {
            println!("  inspected, still locked ({:?})", ctx.payload());
        }))
        .executor(SyncTaskExecutor)
        .build()
        .unwrap();

    machine.on_state_changed(|from, to| {
        println!("  {:?} -> {:?}", from.map(|s| s.id()), to.id());
    });

    println!("Starting:");
    machine.start().unwrap();

    println!("\nPush before paying (deferred):");
    machine.send_event(Input::Push);
    println!("  deferred events: {}", machine.deferred_events().len());

    println!("\nInspect (internal transition):");
    machine.send_event(Input::Inspect);

    println!("\nInsert coin (deferred push is retried):");
    machine.send_event(Input::Coin);
    println!("  deferred events: {}", machine.deferred_events().len());

    println!("\nFinal state: {:?}", machine.state_id());
    println!(
        "Visitors: {}",
        machine.extended_state().get::<u64>("passed").unwrap_or(0)
    );

    println!("\n=== Example Complete ===");
}
