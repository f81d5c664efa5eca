//! Reactivity core - dependency tracking and write fan-out.
//!
//! Three pieces cooperate here:
//!
//! - [`Store`]: the observed properties, one backing value and one Dep per
//!   key, plus the active-watcher slot used for implicit dependency
//!   discovery.
//! - `Dep` (internal): the per-key registry of watcher ids, insertion
//!   ordered and idempotent.
//! - [`Watcher`]: one binding from a property to a display target, re-run
//!   synchronously on every write that changes the property.
//!
//! A watcher never declares its dependency explicitly. Its capture-and-bind
//! step occupies the store's active slot and reads the property; the read
//! path sees the occupant and registers it with the key's Dep. That is the
//! whole discovery mechanism.

mod dep;
mod store;
mod watcher;

pub use store::{Store, WritePolicy};
pub use watcher::{BindingTarget, Watcher, WatcherId};
