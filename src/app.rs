//! App - root orchestrator.
//!
//! Ties the pieces together exactly once per construction: store the data,
//! observe every top-level key, resolve the mount selector, compile the
//! mount target's existing children, reattach them. There is no re-mount,
//! re-compile, or teardown.
//!
//! # Example
//!
//! ```ignore
//! use filament::{App, AppOptions, Dom, Value};
//! use indexmap::IndexMap;
//!
//! let dom = Dom::new();
//! let container = dom.create_element("div");
//! dom.set_attribute(container, "id", "app");
//! dom.append_child(dom.root(), container);
//! dom.append_child(container, dom.create_text("{{ msg }}"));
//!
//! let app = App::mount(&dom, AppOptions {
//!     mount: "#app".to_string(),
//!     data: IndexMap::from([("msg".to_string(), Value::from("hi"))]),
//! })?;
//!
//! app.set("msg", "bye"); // the text node now reads "bye"
//! ```

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::compile::compile_children;
use crate::dom::{Dom, NodeId};
use crate::reactive::Store;
use crate::types::Value;

// =============================================================================
// Errors
// =============================================================================

/// Construction failure.
///
/// The missing mount target is the one fatal condition; every other
/// irregularity (missing keys, malformed interpolations) degrades silently.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("mount selector {selector:?} did not match any node")]
    TargetNotFound { selector: String },
}

// =============================================================================
// Options
// =============================================================================

/// Construction input: a mount selector and the initial data.
///
/// Exactly these two fields are recognized. `data` is taken over by the
/// app, not copied - the store mutates it key by key for its lifetime.
pub struct AppOptions {
    /// Selector identifying exactly one existing node (`#id` or tag name).
    pub mount: String,
    /// Top-level keys to observe.
    pub data: IndexMap<String, Value>,
}

impl AppOptions {
    /// Options with an empty data set.
    pub fn new(mount: impl Into<String>) -> Self {
        AppOptions {
            mount: mount.into(),
            data: IndexMap::new(),
        }
    }

    /// Add one data key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// App
// =============================================================================

/// A mounted application: an observed data set wired to a compiled subtree.
pub struct App {
    dom: Dom,
    store: Store,
    mount: NodeId,
}

impl App {
    /// Observe the data, compile the mount target's children, reattach.
    ///
    /// Fails only when the selector matches no node.
    pub fn mount(dom: &Dom, options: AppOptions) -> Result<Self, MountError> {
        let mount = dom
            .query_selector(&options.mount)
            .ok_or(MountError::TargetNotFound {
                selector: options.mount.clone(),
            })?;
        debug!(selector = %options.mount, keys = options.data.len(), "mounting");

        let store = Store::new();
        store.observe(options.data);
        compile_children(dom, &store, mount);

        Ok(App {
            dom: dom.clone(),
            store,
            mount,
        })
    }

    /// Read a property. See [`Store::get`].
    pub fn get(&self, key: &str) -> Value {
        self.store.get(key)
    }

    /// Write a property, synchronously updating every binding that depends
    /// on it. See [`Store::set`].
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.store.set(key, value);
    }

    /// A handle to the underlying store. Writes through the clone notify
    /// the same bindings.
    pub fn store(&self) -> Store {
        self.store.clone()
    }

    /// The document this app is mounted in.
    pub fn dom(&self) -> Dom {
        self.dom.clone()
    }

    /// The resolved mount node.
    pub fn mount_point(&self) -> NodeId {
        self.mount
    }
}

// =============================================================================
// Tests
// =============================================================================
