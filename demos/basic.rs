//! Basic Example - Mount an app and drive it from both directions
//!
//! This example demonstrates the core flow:
//! - Building a host document with an interpolation and a bound input
//! - Mounting an app over it
//! - Writing data and watching the text node follow
//! - Dispatching an input event and watching the data follow
//!
//! Run with: cargo run --example basic

use filament::{App, AppOptions, Dom, MODEL_ATTR};

fn main() {
    println!("=== filament Basic Example ===\n");

    // Build the host document:
    //   <div id="app">
    //     {{ msg }}
    //     <input f-model="msg">
    //   </div>
    let dom = Dom::new();
    let container = dom.create_element("div");
    dom.set_attribute(container, "id", "app");
    dom.append_child(dom.root(), container);

    let text = dom.create_text("{{ msg }}");
    let input = dom.create_element("input");
    dom.set_attribute(input, MODEL_ATTR, "msg");
    dom.append_child(container, text);
    dom.append_child(container, input);

    // Mount
    let app = App::mount(&dom, AppOptions::new("#app").with("msg", "hi"))
        .expect("mount target exists");

    println!("Initial state:");
    println!("  text node:   \"{}\"", dom.text(text).unwrap());
    println!("  input value: \"{}\"", dom.value(input).unwrap());
    println!(
        "  f-model attribute stripped: {}",
        !dom.has_attribute(input, MODEL_ATTR)
    );

    // Data -> display
    println!("\n--- app.set(\"msg\", \"bye\") ---\n");
    app.set("msg", "bye");
    println!("  text node:   \"{}\"", dom.text(text).unwrap());

    // Display -> data
    println!("\n--- user types \"yo\" into the input ---\n");
    dom.dispatch_input(input, "yo");
    println!("  data.msg:    \"{}\"", app.get("msg").display());
    println!("  text node:   \"{}\"", dom.text(text).unwrap());

    println!("\n=== Two-way binding works! ===");
}
