//! Watcher - a binding between one observed property and one display target.
//!
//! A watcher is "armed" only during its capture window: it occupies the
//! store's active-watcher slot, reads its property (which registers it with
//! the property's Dep as a side effect), releases the slot, then writes the
//! fetched value into its target. The same sequence runs once at creation
//! and once per notification, so the target always reflects the property's
//! value at the end of every write.
//!
//! Watchers live in an append-only arena on the store and are never
//! destroyed - a binding lasts as long as its display target.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{Dom, NodeId};
use crate::types::Value;

use super::store::Store;

// =============================================================================
// Watcher Id
// =============================================================================

/// Stable index of a watcher in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(pub(crate) usize);

// =============================================================================
// Binding Target
// =============================================================================

/// Where a watcher writes the values it observes.
///
/// Node targets render through [`Value::display`]; `Sink` hands the raw
/// value to a host callback, for embedders whose display lives outside the
/// document (and for instrumenting updates in tests).
#[derive(Clone)]
pub enum BindingTarget {
    /// A text node's content.
    Text { dom: Dom, node: NodeId },
    /// An element's input value.
    InputValue { dom: Dom, node: NodeId },
    /// A host callback.
    Sink(Rc<dyn Fn(&Value)>),
}

impl BindingTarget {
    /// Host callback target from a closure.
    pub fn sink(f: impl Fn(&Value) + 'static) -> Self {
        BindingTarget::Sink(Rc::new(f))
    }

    pub(crate) fn write(&self, value: &Value) {
        match self {
            BindingTarget::Text { dom, node } => dom.set_text(*node, &value.display()),
            BindingTarget::InputValue { dom, node } => dom.set_value(*node, &value.display()),
            BindingTarget::Sink(f) => f(value),
        }
    }
}

// =============================================================================
// Watcher
// =============================================================================

pub struct Watcher {
    pub(crate) key: String,
    pub(crate) target: BindingTarget,
    pub(crate) last: RefCell<Value>,
}

impl Watcher {
    /// Run the capture-and-bind sequence: read the property with this
    /// watcher occupying the active slot, record the value, write it to
    /// the display target.
    ///
    /// The target write happens after all internal borrows are released,
    /// so a `Sink` callback may write back into the store. With the default
    /// write policy such a re-entrant write recurses on the same call
    /// stack; see [`WritePolicy`](super::WritePolicy) for the opt-in guard.
    pub(crate) fn capture_and_bind(&self, id: WatcherId, store: &Store) {
        let value = store.tracked_read(id, &self.key);
        *self.last.borrow_mut() = value.clone();
        self.target.write(&value);
    }

    /// The value this watcher last wrote to its target.
    pub fn last_value(&self) -> Value {
        self.last.borrow().clone()
    }
}
