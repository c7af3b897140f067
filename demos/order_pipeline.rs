//! Order Pipeline
//!
//! This example demonstrates a machine driven from several threads.
//!
//! Key concepts:
//! - Background processing on the default thread executor
//! - Guards reading message headers
//! - Ordered transition handlers registered per state pair
//! - Structured logging through `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example order_pipeline

use serde_json::json;
use statework::builder::TransitionBuilder;
use statework::core::{Message, State, StateContext};
use statework::machine::{HandlerRegistry, StateMachine, TransitionHandler};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Order {
    Placed,
    Paid,
    Shipped,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Command {
    Pay,
    Ship,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Order Pipeline ===\n");

    let handlers = HandlerRegistry::new()
        .with_handler(
            Order::Placed,
            Order::Paid,
            TransitionHandler::new(|ctx: &StateContext<Command>| {
                json!({ "receipt": ctx.headers().get("payer").cloned() })
            })
            .with_order(1),
        )
        .with_handler(
            Order::Paid,
            Order::Shipped,
            TransitionHandler::new(|ctx: &StateContext<Command>| {
                let _ = ctx.extended_state().set("shipped", true);
                json!("dispatched")
            }),
        );

    let machine = StateMachine::builder()
        .id("order-42")
        .state(State::new(Order::Placed).defer(Command::Ship))
        .state(State::new(Order::Paid))
        .state(State::new(Order::Shipped))
        .initial(Order::Placed)
        .transition(
            TransitionBuilder::new()
                .source(Order::Placed)
                .target(Order::Paid)
                .event(Command::Pay)
                .when(|ctx| ctx.headers().contains_key("payer")),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .source(Order::Paid)
                .target(Order::Shipped)
                .event(Command::Ship),
        )
        .unwrap()
        .handlers(handlers)
        .build()
        .unwrap();

    machine.start().unwrap();
    println!("Started in {:?}", machine.state_id());

    let warehouse = {
        let machine = machine.clone();
        thread::spawn(move || machine.send_event(Command::Ship))
    };
    let checkout = {
        let machine = machine.clone();
        thread::spawn(move || {
            machine.send_event(Message::new(Command::Pay).with_header("payer", "ada"));
        })
    };
    warehouse.join().unwrap();
    checkout.join().unwrap();

    while !machine.is_idle() {
        thread::sleep(Duration::from_millis(1));
    }

    println!("Final state: {:?}", machine.state_id());
    println!(
        "Shipped flag: {:?}",
        machine.extended_state().get::<bool>("shipped")
    );

    println!("\n=== Example Complete ===");
}
