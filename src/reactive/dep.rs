//! Dep - per-property subscriber registry.
//!
//! One Dep exists per observed key for the store's lifetime. It records
//! which watchers read that key and hands the store a snapshot to notify.
//!
//! Membership is an insertion-ordered set, so registration is idempotent
//! (a watcher that re-reads the same key during one capture window is
//! recorded once) while notification order stays deterministic.

use indexmap::IndexSet;

use super::watcher::WatcherId;

// =============================================================================
// Dep
// =============================================================================

pub(crate) struct Dep {
    subs: IndexSet<WatcherId>,
}

impl Dep {
    pub(crate) fn new() -> Self {
        Dep {
            subs: IndexSet::new(),
        }
    }

    /// Register a watcher as depending on this key. Idempotent; first
    /// registration fixes the watcher's position in notification order.
    pub(crate) fn register(&mut self, id: WatcherId) {
        self.subs.insert(id);
    }

    /// Snapshot the subscribers in registration order.
    ///
    /// The store notifies from this snapshot rather than iterating the set
    /// directly, so registrations that happen while an update runs do not
    /// invalidate the iteration.
    pub(crate) fn subscribers(&self) -> Vec<WatcherId> {
        self.subs.iter().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.subs.len()
    }
}
