//! Store - observed properties, dependency capture, and write fan-out.
//!
//! The store owns everything the reactivity core needs: the backing value
//! and [`Dep`] for each observed key, the watcher arena, and the
//! active-watcher slot used for implicit dependency discovery. The slot is
//! per-store state rather than a process-wide register, and captures
//! save/restore it, so nested captures compose and independent stores never
//! interfere.
//!
//! All mutation of observed data goes through [`Store::set`]: a write that
//! changes a value synchronously re-runs every registered watcher, in
//! registration order, before the call returns. There is no batching,
//! deduplication, or deferral of notifications.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::types::Value;

use super::dep::Dep;
use super::watcher::{BindingTarget, Watcher, WatcherId};

// =============================================================================
// Write Policy
// =============================================================================

/// How the store treats a write to a key that is already mid-notification.
///
/// The default preserves the engine's natural behavior: the write runs its
/// notification chain on the same call stack, which can recurse without
/// bound if a target keeps writing the key back (stack exhaustion is the
/// documented hazard). `DeferReentrant` is the explicit opt-in guard: such
/// writes are queued and drained once the active chain unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    Unguarded,
    DeferReentrant,
}

// =============================================================================
// Store
// =============================================================================

struct Entry {
    value: Value,
    dep: Dep,
}

struct StoreInner {
    entries: RefCell<IndexMap<String, Entry>>,
    watchers: RefCell<Vec<Rc<Watcher>>>,
    /// Active-watcher slot: occupied only for the synchronous extent of a
    /// capture. Reads that happen while it is occupied register the
    /// occupant with the key's Dep.
    active: Cell<Option<WatcherId>>,
    /// Keys currently mid-notification, innermost last.
    notifying: RefCell<Vec<String>>,
    deferred: RefCell<VecDeque<(String, Value)>>,
    policy: Cell<WritePolicy>,
}

/// Shared handle to a set of observed properties.
///
/// Cheap to clone; every clone refers to the same data, so an input
/// listener, the owning app, and any external holder all observe the same
/// mutations.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with no observed keys.
    pub fn new() -> Self {
        Store {
            inner: Rc::new(StoreInner {
                entries: RefCell::new(IndexMap::new()),
                watchers: RefCell::new(Vec::new()),
                active: Cell::new(None),
                notifying: RefCell::new(Vec::new()),
                deferred: RefCell::new(VecDeque::new()),
                policy: Cell::new(WritePolicy::default()),
            }),
        }
    }

    // =========================================================================
    // Observe
    // =========================================================================

    /// Install every top-level key of `data` as an observed property with
    /// its own Dep.
    ///
    /// A key that is already observed keeps its entry - exactly one Dep
    /// exists per key for the store's lifetime.
    pub fn observe(&self, data: impl IntoIterator<Item = (String, Value)>) {
        let mut entries = self.inner.entries.borrow_mut();
        for (key, value) in data {
            trace!(key = %key, "observing key");
            entries.entry(key).or_insert_with(|| Entry {
                value,
                dep: Dep::new(),
            });
        }
    }

    // =========================================================================
    // Read / Write
    // =========================================================================

    /// Read a property.
    ///
    /// If a capture is in flight, the capturing watcher is registered with
    /// the key's Dep. Reading a key that was never observed yields
    /// [`Value::Absent`] and registers nothing.
    pub fn get(&self, key: &str) -> Value {
        let mut entries = self.inner.entries.borrow_mut();
        let Some(entry) = entries.get_mut(key) else {
            return Value::Absent;
        };
        if let Some(id) = self.inner.active.get() {
            entry.dep.register(id);
        }
        entry.value.clone()
    }

    /// Write a property. The sole mutation entry point for observed keys.
    ///
    /// If the new value equals the current one (strict equality) this is a
    /// complete no-op: no mutation, no notification. Otherwise the backing
    /// value is replaced and every watcher registered with the key is
    /// re-run, in registration order, before `set` returns.
    ///
    /// Writing a key that was never observed inserts it; it becomes
    /// readable, but nothing was bound to it, so nothing updates.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.write(key, value.into());
    }

    fn write(&self, key: &str, value: Value) {
        if self.inner.policy.get() == WritePolicy::DeferReentrant
            && self.inner.notifying.borrow().iter().any(|k| k == key)
        {
            trace!(key, "deferring re-entrant write");
            self.inner
                .deferred
                .borrow_mut()
                .push_back((key.to_string(), value));
            return;
        }

        let subs = {
            let mut entries = self.inner.entries.borrow_mut();
            match entries.get_mut(key) {
                Some(entry) => {
                    if entry.value == value {
                        return;
                    }
                    entry.value = value;
                    entry.dep.subscribers()
                }
                None => {
                    entries.insert(
                        key.to_string(),
                        Entry {
                            value,
                            dep: Dep::new(),
                        },
                    );
                    Vec::new()
                }
            }
        };

        trace!(key, subscribers = subs.len(), "notifying");
        self.inner.notifying.borrow_mut().push(key.to_string());
        for id in subs {
            self.update_watcher(id);
        }
        self.inner.notifying.borrow_mut().pop();

        self.drain_deferred();
    }

    /// Drain writes deferred during the chain that just unwound. Only runs
    /// once no notification is active; each drained write may defer more.
    fn drain_deferred(&self) {
        if !self.inner.notifying.borrow().is_empty() {
            return;
        }
        loop {
            let next = self.inner.deferred.borrow_mut().pop_front();
            match next {
                Some((key, value)) => self.write(&key, value),
                None => break,
            }
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Create a watcher binding `key` to `target` and run its initial
    /// capture-and-bind, so the target immediately reflects the property
    /// and the watcher is registered for future writes.
    pub fn bind(&self, key: &str, target: BindingTarget) -> WatcherId {
        let id = {
            let mut watchers = self.inner.watchers.borrow_mut();
            let id = WatcherId(watchers.len());
            watchers.push(Rc::new(Watcher {
                key: key.to_string(),
                target,
                last: RefCell::new(Value::Absent),
            }));
            id
        };
        debug!(key, watcher = id.0, "created binding");
        self.update_watcher(id);
        id
    }

    /// Re-run a watcher's capture-and-bind.
    ///
    /// The arena borrow is released before the watcher runs (the watcher
    /// re-reads the store and writes its target, either of which may reach
    /// back in here).
    fn update_watcher(&self, id: WatcherId) {
        let watcher = self.inner.watchers.borrow().get(id.0).cloned();
        if let Some(watcher) = watcher {
            watcher.capture_and_bind(id, self);
        }
    }

    /// Read `key` with `id` occupying the active slot.
    ///
    /// The previous occupant is restored afterwards, so nested captures
    /// compose instead of clobbering each other.
    pub(crate) fn tracked_read(&self, id: WatcherId, key: &str) -> Value {
        let prev = self.inner.active.replace(Some(id));
        let value = self.get(key);
        self.inner.active.set(prev);
        value
    }

    // =========================================================================
    // Policy
    // =========================================================================

    /// Replace the re-entrant-write policy.
    pub fn set_write_policy(&self, policy: WritePolicy) {
        self.inner.policy.set(policy);
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.inner.policy.get()
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Whether `key` is observed (or was inserted by a later write).
    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    /// Observed keys, in observation order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    /// Look up a watcher by id.
    pub fn watcher(&self, id: WatcherId) -> Option<Rc<Watcher>> {
        self.inner.watchers.borrow().get(id.0).cloned()
    }

    /// Number of watchers registered with `key`. Zero for unknown keys.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .entries
            .borrow()
            .get(key)
            .map_or(0, |entry| entry.dep.len())
    }

    #[cfg(test)]
    pub(crate) fn active_watcher(&self) -> Option<WatcherId> {
        self.inner.active.get()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with(data: &[(&str, &str)]) -> Store {
        let store = Store::new();
        store.observe(
            data.iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v))),
        );
        store
    }

    fn record_sink(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> BindingTarget {
        let log = log.clone();
        let tag = tag.to_string();
        BindingTarget::sink(move |v| log.borrow_mut().push(format!("{tag}={}", v.display())))
    }

    #[test]
    fn test_round_trip() {
        let store = store_with(&[("msg", "hi")]);
        let log = Rc::new(RefCell::new(Vec::new()));

        let id = store.bind("msg", record_sink(&log, "a"));
        assert_eq!(*log.borrow(), vec!["a=hi"]);

        store.set("msg", "bye");
        assert_eq!(*log.borrow(), vec!["a=hi", "a=bye"]);
        assert_eq!(store.get("msg"), Value::from("bye"));
        assert_eq!(store.watcher(id).unwrap().last_value(), Value::from("bye"));
    }

    #[test]
    fn test_equal_write_is_a_no_op() {
        let store = store_with(&[("msg", "hi")]);
        let count = Rc::new(RefCell::new(0));
        let count_clone = count.clone();
        store.bind(
            "msg",
            BindingTarget::sink(move |_| *count_clone.borrow_mut() += 1),
        );
        assert_eq!(*count.borrow(), 1); // initial bind

        store.set("msg", "hi");
        assert_eq!(*count.borrow(), 1);

        store.set("msg", "hi!");
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let store = store_with(&[("k", "0")]);
        let log = Rc::new(RefCell::new(Vec::new()));

        store.bind("k", record_sink(&log, "first"));
        store.bind("k", record_sink(&log, "second"));
        store.bind("k", record_sink(&log, "third"));
        log.borrow_mut().clear();

        store.set("k", "1");
        assert_eq!(*log.borrow(), vec!["first=1", "second=1", "third=1"]);
    }

    #[test]
    fn test_rebinding_does_not_duplicate_registration() {
        let store = store_with(&[("k", "0")]);
        let count = Rc::new(RefCell::new(0));
        let count_clone = count.clone();
        store.bind(
            "k",
            BindingTarget::sink(move |_| *count_clone.borrow_mut() += 1),
        );
        assert_eq!(store.subscriber_count("k"), 1);

        // Every notification re-runs capture-and-bind; the set membership
        // must stay at one and each write must update the target once.
        store.set("k", "1");
        store.set("k", "2");
        assert_eq!(store.subscriber_count("k"), 1);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_missing_key_reads_absent_and_registers_nothing() {
        let store = store_with(&[("present", "x")]);
        let log = Rc::new(RefCell::new(Vec::new()));

        store.bind("ghost", record_sink(&log, "g"));
        assert_eq!(*log.borrow(), vec!["g="]);
        assert_eq!(store.subscriber_count("ghost"), 0);
        assert_eq!(store.get("ghost"), Value::Absent);
    }

    #[test]
    fn test_write_to_unobserved_key_inserts_it() {
        let store = store_with(&[]);
        assert!(!store.contains("late"));

        store.set("late", "v");
        assert!(store.contains("late"));
        assert_eq!(store.get("late"), Value::from("v"));
    }

    #[test]
    fn test_type_changing_write_is_accepted() {
        let store = store_with(&[("n", "1")]);
        store.set("n", 2i64);
        assert_eq!(store.get("n"), Value::from(2i64));
    }

    #[test]
    fn test_active_slot_is_empty_outside_captures() {
        let store = store_with(&[("k", "0")]);
        assert_eq!(store.active_watcher(), None);

        store.bind("k", BindingTarget::sink(|_| {}));
        assert_eq!(store.active_watcher(), None);

        store.set("k", "1");
        assert_eq!(store.active_watcher(), None);
    }

    #[test]
    fn test_nested_capture_restores_outer_occupant() {
        let store = store_with(&[("outer", "a"), ("inner", "b")]);

        // Creating a binding from inside another watcher's target write
        // must not leave the slot occupied or corrupt the outer
        // registration.
        let store_clone = store.clone();
        let nested = Rc::new(RefCell::new(None));
        let nested_clone = nested.clone();
        store.bind(
            "outer",
            BindingTarget::sink(move |_| {
                if nested_clone.borrow().is_none() {
                    let id = store_clone.bind("inner", BindingTarget::sink(|_| {}));
                    *nested_clone.borrow_mut() = Some(id);
                }
            }),
        );

        assert_eq!(store.subscriber_count("outer"), 1);
        assert_eq!(store.subscriber_count("inner"), 1);
        assert_eq!(store.active_watcher(), None);
    }

    #[test]
    fn test_defer_reentrant_write_terminates() {
        let store = store_with(&[("k", "start")]);
        assert_eq!(store.write_policy(), WritePolicy::Unguarded);
        store.set_write_policy(WritePolicy::DeferReentrant);
        assert_eq!(store.write_policy(), WritePolicy::DeferReentrant);

        // A sink that writes its own key back would recurse forever under
        // the default policy. Deferred, the write runs after the chain
        // unwinds and converges once values stop changing.
        let store_clone = store.clone();
        let runs = Rc::new(RefCell::new(0));
        let runs_clone = runs.clone();
        store.bind(
            "k",
            BindingTarget::sink(move |v| {
                *runs_clone.borrow_mut() += 1;
                if *v != Value::from("settled") {
                    store_clone.set("k", "settled");
                }
            }),
        );

        store.set("k", "poke");
        assert_eq!(store.get("k"), Value::from("settled"));
        // bind, inline settle during bind (no chain active yet), "poke",
        // then the deferred settle.
        assert_eq!(*runs.borrow(), 4);
    }

    #[test]
    fn test_unguarded_write_to_other_key_runs_inline() {
        let store = store_with(&[("a", "0"), ("b", "0")]);
        let log = Rc::new(RefCell::new(Vec::new()));

        let store_clone = store.clone();
        let log_clone = log.clone();
        store.bind(
            "a",
            BindingTarget::sink(move |v| {
                log_clone.borrow_mut().push(format!("a={}", v.display()));
                if *v == Value::from("1") {
                    store_clone.set("b", "cascade");
                }
            }),
        );
        store.bind("b", record_sink(&log, "b"));
        log.borrow_mut().clear();

        // The write to "b" completes inside the write to "a".
        store.set("a", "1");
        assert_eq!(*log.borrow(), vec!["a=1", "b=cascade"]);
    }

    #[test]
    fn test_keys_in_observation_order() {
        let store = store_with(&[("b", "1"), ("a", "2"), ("c", "3")]);
        assert_eq!(store.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_observe_keeps_existing_entries() {
        let store = store_with(&[("k", "original")]);
        store.bind("k", BindingTarget::sink(|_| {}));

        store.observe([("k".to_string(), Value::from("clobbered"))]);
        assert_eq!(store.get("k"), Value::from("original"));
        assert_eq!(store.subscriber_count("k"), 1);
    }
}
