//! Host document model - node arena, selector lookup, input dispatch.
//!
//! A deliberately small stand-in for a real document tree. Nodes are indices
//! into an arena rather than owned objects, so bindings can hold a stable
//! [`NodeId`] for as long as the document lives. The tree is mutated through
//! the shared [`Dom`] handle; every method takes a short borrow and releases
//! it before invoking any user callback.
//!
//! The compiler only distinguishes three node kinds: elements (attributes,
//! an input value, input listeners), text nodes, and comments. Comments
//! exist so there is a node kind the compiler must skip.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Node Types
// =============================================================================

/// Stable identifier of a node in the arena.
///
/// Ids are never reused - nodes are detached, not destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Input listener callback, invoked with the element's new value.
///
/// Rc so the same listener can be snapshotted out of the document and
/// invoked after the borrow is released.
pub type InputListener = Rc<dyn Fn(&str)>;

/// Discriminant of a node's kind, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
}

enum NodeKind {
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
        value: String,
        input_listeners: Vec<InputListener>,
    },
    Text {
        content: String,
    },
    Comment,
}

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// =============================================================================
// Document
// =============================================================================

struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element {
                tag: "root".to_string(),
                attrs: IndexMap::new(),
                value: String::new(),
                input_listeners: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Document {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    /// Depth-first pre-order walk from the root, returning the first node
    /// matching the predicate.
    fn find(&self, pred: &dyn Fn(&Node) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if pred(node) {
                return Some(id);
            }
            // Push children in reverse so the walk visits them in order.
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        None
    }
}

// =============================================================================
// Dom Handle
// =============================================================================

/// Shared handle to a document.
///
/// Cheap to clone; every clone refers to the same tree. Bindings created by
/// the compiler keep a clone so they can write display targets later.
#[derive(Clone)]
pub struct Dom {
    inner: Rc<RefCell<Document>>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty document with a single `root` element.
    pub fn new() -> Self {
        Dom {
            inner: Rc::new(RefCell::new(Document::new())),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    // =========================================================================
    // Node Creation
    // =========================================================================

    /// Create a detached element node.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().push(NodeKind::Element {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            value: String::new(),
            input_listeners: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&self, content: &str) -> NodeId {
        self.inner.borrow_mut().push(NodeKind::Text {
            content: content.to_string(),
        })
    }

    /// Create a detached comment node.
    pub fn create_comment(&self) -> NodeId {
        self.inner.borrow_mut().push(NodeKind::Comment)
    }

    // =========================================================================
    // Tree Structure
    // =========================================================================

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent if it had one.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut doc = self.inner.borrow_mut();
        doc.detach(child);
        doc.nodes[child.0].parent = Some(parent);
        doc.nodes[parent.0].children.push(child);
    }

    /// The node's children, in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().nodes[node.0].children.clone()
    }

    /// Detach all children of `node` into a fragment, preserving order.
    ///
    /// The returned ids stay valid; reattach them with
    /// [`append_children`](Self::append_children).
    pub fn detach_children(&self, node: NodeId) -> Vec<NodeId> {
        let mut doc = self.inner.borrow_mut();
        let children = std::mem::take(&mut doc.nodes[node.0].children);
        for &child in &children {
            doc.nodes[child.0].parent = None;
        }
        children
    }

    /// Reattach a fragment under `node`, preserving order.
    pub fn append_children(&self, node: NodeId, fragment: &[NodeId]) {
        for &child in fragment {
            self.append_child(node, child);
        }
    }

    /// The node's kind.
    pub fn node_type(&self, node: NodeId) -> NodeType {
        match self.inner.borrow().nodes[node.0].kind {
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Comment => NodeType::Comment,
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set an attribute on an element. No-op on other node kinds.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut doc = self.inner.borrow_mut();
        if let NodeKind::Element { attrs, .. } = &mut doc.nodes[node.0].kind {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Read an attribute from an element.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.inner.borrow().nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).cloned(),
            _ => None,
        }
    }

    /// Remove an attribute from an element.
    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        let mut doc = self.inner.borrow_mut();
        if let NodeKind::Element { attrs, .. } = &mut doc.nodes[node.0].kind {
            attrs.shift_remove(name);
        }
    }

    /// Whether an element carries the attribute.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// The element's tag name.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.inner.borrow().nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    // =========================================================================
    // Text / Value
    // =========================================================================

    /// A text node's content.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.inner.borrow().nodes[node.0].kind {
            NodeKind::Text { content } => Some(content.clone()),
            _ => None,
        }
    }

    /// Replace a text node's content. No-op on other node kinds.
    pub fn set_text(&self, node: NodeId, content: &str) {
        let mut doc = self.inner.borrow_mut();
        if let NodeKind::Text { content: c } = &mut doc.nodes[node.0].kind {
            *c = content.to_string();
        }
    }

    /// An element's input value.
    pub fn value(&self, node: NodeId) -> Option<String> {
        match &self.inner.borrow().nodes[node.0].kind {
            NodeKind::Element { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    /// Replace an element's input value. No-op on other node kinds.
    ///
    /// A programmatic value write does not fire input listeners; only
    /// [`dispatch_input`](Self::dispatch_input) does.
    pub fn set_value(&self, node: NodeId, value: &str) {
        let mut doc = self.inner.borrow_mut();
        if let NodeKind::Element { value: v, .. } = &mut doc.nodes[node.0].kind {
            *v = value.to_string();
        }
    }

    // =========================================================================
    // Input Events
    // =========================================================================

    /// Register an input listener on an element.
    pub fn add_input_listener(&self, node: NodeId, listener: impl Fn(&str) + 'static) {
        let mut doc = self.inner.borrow_mut();
        if let NodeKind::Element {
            input_listeners, ..
        } = &mut doc.nodes[node.0].kind
        {
            input_listeners.push(Rc::new(listener));
        }
    }

    /// Simulate user input on an element: set its value, then invoke its
    /// input listeners with the new value.
    ///
    /// Listeners are snapshotted and invoked after the document borrow is
    /// released, so a listener may freely write back into the tree.
    pub fn dispatch_input(&self, node: NodeId, value: &str) {
        let listeners: Vec<InputListener> = {
            let mut doc = self.inner.borrow_mut();
            match &mut doc.nodes[node.0].kind {
                NodeKind::Element {
                    value: v,
                    input_listeners,
                    ..
                } => {
                    *v = value.to_string();
                    input_listeners.clone()
                }
                _ => return,
            }
        };
        for listener in listeners {
            listener(value);
        }
    }

    // =========================================================================
    // Selector Lookup
    // =========================================================================

    /// Resolve a selector to the first matching node, depth-first.
    ///
    /// Two forms are understood: `#name` matches an element whose `id`
    /// attribute equals `name`; anything else matches by tag name.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let doc = self.inner.borrow();
        if let Some(id) = selector.strip_prefix('#') {
            doc.find(&|node| match &node.kind {
                NodeKind::Element { attrs, .. } => {
                    attrs.get("id").map(String::as_str) == Some(id)
                }
                _ => false,
            })
        } else {
            doc.find(&|node| match &node.kind {
                NodeKind::Element { tag, .. } => tag == selector,
                _ => false,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
