//! Reactive Example - Bindings, fan-out, and the write policy
//!
//! This example works below the app layer, using the store directly:
//! - Creating sink bindings (display targets outside the document)
//! - One write fanning out to several bindings in registration order
//! - Equal writes short-circuiting
//! - The opt-in guard for re-entrant writes
//!
//! Run with: cargo run --example reactive

use filament::{BindingTarget, Store, Value, WritePolicy};

fn main() {
    println!("=== filament Reactive Example ===\n");

    let store = Store::new();
    store.observe([
        ("count".to_string(), Value::from(0i64)),
        ("label".to_string(), Value::from("ready")),
    ]);

    // Three bindings on the same key - one write updates all three,
    // in the order they were registered.
    for tag in ["first", "second", "third"] {
        store.bind(
            "count",
            BindingTarget::sink(move |v| println!("  [{tag}] count = {}", v.display())),
        );
    }

    println!("\n--- store.set(\"count\", 1) ---");
    store.set("count", 1i64);

    println!("\n--- store.set(\"count\", 1) again (equal write, no output) ---");
    store.set("count", 1i64);

    println!("\n--- re-entrant write, deferred ---");
    store.set_write_policy(WritePolicy::DeferReentrant);

    // This binding writes its own key until it settles. Under the default
    // policy that recursion runs on one call stack; deferred, each write
    // waits for the active chain to unwind.
    let store_clone = store.clone();
    store.bind(
        "label",
        BindingTarget::sink(move |v| {
            println!("  [label] = {}", v.display());
            if *v != Value::from("settled") {
                store_clone.set("label", "settled");
            }
        }),
    );

    store.set("label", "poke");
    println!("\nfinal label: {}", store.get("label").display());

    println!("\n=== Done ===");
}
