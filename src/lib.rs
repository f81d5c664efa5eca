//! # filament
//!
//! Minimal reactive data-binding engine.
//!
//! filament turns a plain bag of key/value pairs into observed properties,
//! discovers which display bindings read which property, and propagates
//! writes to exactly the bindings that depend on them - synchronously,
//! within the write call.
//!
//! ## Architecture
//!
//! Data flows one direction at setup and one direction at runtime:
//! ```text
//! setup:   data -> Store::observe -> one Dep per key
//! compile: template -> bindings (text interpolation, two-way input)
//! runtime: Store::set -> Dep fan-out -> Watcher::capture_and_bind -> target
//! ```
//!
//! Dependency discovery is implicit: while a watcher re-reads its property,
//! it occupies the store's active-watcher slot, and the read path registers
//! the occupant with the property's Dep. No binding ever declares its
//! dependency explicitly.
//!
//! ## Modules
//!
//! - [`types`] - the loosely typed [`Value`] representation
//! - [`reactive`] - store, deps, watchers (the tracking core)
//! - [`dom`] - lightweight host-document model (node arena, selectors,
//!   input dispatch)
//! - [`compile`] - the one-pass template compiler
//! - [`app`] - root orchestrator and construction options

pub mod app;
pub mod compile;
pub mod dom;
pub mod reactive;
pub mod types;

// Re-export commonly used items
pub use types::Value;

pub use app::{App, AppOptions, MountError};

pub use compile::{compile_children, compile_node, MODEL_ATTR};

pub use dom::{Dom, NodeId, NodeType};

pub use reactive::{BindingTarget, Store, Watcher, WatcherId, WritePolicy};
