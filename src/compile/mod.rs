//! Template compiler - one depth-first pass wiring the document to the store.
//!
//! The compiler visits each node of the mount target's subtree exactly once:
//!
//! - Elements: if the two-way-binding attribute ([`MODEL_ATTR`]) is present,
//!   wire an input listener that writes the event value into the store, sync
//!   the element's value from the store once, and strip the attribute so it
//!   never appears in the materialized tree. All other attributes pass
//!   through untouched. Then recurse into children.
//! - Text nodes: if the entire trimmed content is a single `{{ name }}`
//!   interpolation, create a text-target binding for `name`. Anything else
//!   (prose, multiple interpolations, nested braces) is left untouched -
//!   a non-match is a silent no-op, not an error.
//! - Every other node kind is ignored.
//!
//! Children are compiled inside a detached fragment and reattached
//! afterwards, so bindings are installed before the compiled subtree
//! rejoins the document.

use tracing::debug;

use crate::dom::{Dom, NodeId, NodeType};
use crate::reactive::{BindingTarget, Store};

/// The two-way-binding attribute keyword.
pub const MODEL_ATTR: &str = "f-model";

// =============================================================================
// Compilation
// =============================================================================

/// Detach the mount node's children, compile each subtree depth-first,
/// and reattach them in order.
pub fn compile_children(dom: &Dom, store: &Store, mount: NodeId) {
    let fragment = dom.detach_children(mount);
    for &child in &fragment {
        compile_node(dom, store, child);
    }
    dom.append_children(mount, &fragment);
}

/// Compile a single subtree.
pub fn compile_node(dom: &Dom, store: &Store, node: NodeId) {
    match dom.node_type(node) {
        NodeType::Element => {
            bind_model(dom, store, node);
            for child in dom.children(node) {
                compile_node(dom, store, child);
            }
        }
        NodeType::Text => {
            let Some(content) = dom.text(node) else {
                return;
            };
            if let Some(key) = parse_interpolation(&content) {
                debug!(key = %key, "binding text interpolation");
                store.bind(
                    &key,
                    BindingTarget::Text {
                        dom: dom.clone(),
                        node,
                    },
                );
            }
        }
        NodeType::Comment => {}
    }
}

/// Wire the two-way binding on an element carrying [`MODEL_ATTR`].
///
/// Input events route through [`Store::set`] - the store's write path is
/// the only mutation entry point, so an input that changes the value
/// notifies every other binding on the same key before the dispatch
/// returns. The element's value is synced from the store once, here; the
/// element is not subscribed, so later writes to the key do not touch it.
fn bind_model(dom: &Dom, store: &Store, node: NodeId) {
    let Some(key) = dom.attribute(node, MODEL_ATTR) else {
        return;
    };
    debug!(key = %key, "wiring two-way binding");

    let store_clone = store.clone();
    let key_clone = key.clone();
    dom.add_input_listener(node, move |value| {
        store_clone.set(&key_clone, value);
    });

    dom.set_value(node, &store.get(&key).display());
    dom.remove_attribute(node, MODEL_ATTR);
}

/// Match a text node's content against the interpolation pattern.
///
/// The entire trimmed content must be `{{ <name> }}` with no interior
/// braces; interior whitespace around the name is trimmed. A single bare
/// name only - `{{a}} {{b}}` does not match and creates no binding.
fn parse_interpolation(content: &str) -> Option<String> {
    let inner = content.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner.trim().to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use indexmap::IndexMap;

    fn setup(data: &[(&str, &str)]) -> (Dom, Store) {
        let dom = Dom::new();
        let store = Store::new();
        store.observe(
            data.iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect::<IndexMap<_, _>>(),
        );
        (dom, store)
    }

    #[test]
    fn test_parse_interpolation() {
        assert_eq!(parse_interpolation("{{msg}}"), Some("msg".to_string()));
        assert_eq!(parse_interpolation("{{  msg  }}"), Some("msg".to_string()));
        assert_eq!(parse_interpolation("  {{ msg }}  "), Some("msg".to_string()));
        // Single bare name only.
        assert_eq!(parse_interpolation("{{a}} {{b}}"), None);
        assert_eq!(parse_interpolation("{{ {msg} }}"), None);
        assert_eq!(parse_interpolation("hello {{msg}}"), None);
        assert_eq!(parse_interpolation("plain text"), None);
        assert_eq!(parse_interpolation(""), None);
    }

    #[test]
    fn test_text_interpolation_binds_and_renders() {
        let (dom, store) = setup(&[("msg", "hi")]);
        let text = dom.create_text("{{ msg }}");
        dom.append_child(dom.root(), text);

        compile_children(&dom, &store, dom.root());
        assert_eq!(dom.text(text), Some("hi".to_string()));

        store.set("msg", "bye");
        assert_eq!(dom.text(text), Some("bye".to_string()));
    }

    #[test]
    fn test_non_matching_text_is_left_untouched() {
        let (dom, store) = setup(&[("a", "1"), ("b", "2")]);
        let double = dom.create_text("{{a}} {{b}}");
        let prose = dom.create_text("no binding here");
        dom.append_child(dom.root(), double);
        dom.append_child(dom.root(), prose);

        compile_children(&dom, &store, dom.root());
        assert_eq!(dom.text(double), Some("{{a}} {{b}}".to_string()));
        assert_eq!(dom.text(prose), Some("no binding here".to_string()));
        assert_eq!(store.subscriber_count("a"), 0);
        assert_eq!(store.subscriber_count("b"), 0);
    }

    #[test]
    fn test_missing_key_renders_absent() {
        let (dom, store) = setup(&[]);
        let text = dom.create_text("{{ ghost }}");
        dom.append_child(dom.root(), text);

        compile_children(&dom, &store, dom.root());
        assert_eq!(dom.text(text), Some(String::new()));
    }

    #[test]
    fn test_compiles_depth_first_into_nested_elements() {
        let (dom, store) = setup(&[("msg", "deep")]);
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        let text = dom.create_text("{{msg}}");
        dom.append_child(dom.root(), outer);
        dom.append_child(outer, inner);
        dom.append_child(inner, text);

        compile_children(&dom, &store, dom.root());
        assert_eq!(dom.text(text), Some("deep".to_string()));
    }

    #[test]
    fn test_comments_are_ignored() {
        let (dom, store) = setup(&[("msg", "hi")]);
        let comment = dom.create_comment();
        dom.append_child(dom.root(), comment);

        compile_children(&dom, &store, dom.root());
        assert_eq!(store.subscriber_count("msg"), 0);
    }

    #[test]
    fn test_model_attribute_is_stripped_and_synced() {
        let (dom, store) = setup(&[("name", "ada")]);
        let input = dom.create_element("input");
        dom.set_attribute(input, MODEL_ATTR, "name");
        dom.set_attribute(input, "class", "wide");
        dom.append_child(dom.root(), input);

        compile_children(&dom, &store, dom.root());
        assert!(!dom.has_attribute(input, MODEL_ATTR));
        // Other attributes pass through.
        assert_eq!(dom.attribute(input, "class"), Some("wide".to_string()));
        // First synchronous sync from the store.
        assert_eq!(dom.value(input), Some("ada".to_string()));
    }

    #[test]
    fn test_input_writes_through_the_store() {
        let (dom, store) = setup(&[("name", "ada")]);
        let input = dom.create_element("input");
        dom.set_attribute(input, MODEL_ATTR, "name");
        let text = dom.create_text("{{ name }}");
        dom.append_child(dom.root(), input);
        dom.append_child(dom.root(), text);

        compile_children(&dom, &store, dom.root());

        dom.dispatch_input(input, "grace");
        assert_eq!(store.get("name"), Value::from("grace"));
        // The text interpolation elsewhere updated within the dispatch.
        assert_eq!(dom.text(text), Some("grace".to_string()));
    }

    #[test]
    fn test_model_sync_does_not_subscribe_the_element() {
        let (dom, store) = setup(&[("name", "ada")]);
        let input = dom.create_element("input");
        dom.set_attribute(input, MODEL_ATTR, "name");
        dom.append_child(dom.root(), input);

        compile_children(&dom, &store, dom.root());
        assert_eq!(store.subscriber_count("name"), 0);

        // A later write does not touch the element's value.
        store.set("name", "grace");
        assert_eq!(dom.value(input), Some("ada".to_string()));
    }

    #[test]
    fn test_fragment_round_trip_preserves_order() {
        let (dom, store) = setup(&[("msg", "hi")]);
        let a = dom.create_element("div");
        let b = dom.create_text("{{msg}}");
        let c = dom.create_element("span");
        dom.append_child(dom.root(), a);
        dom.append_child(dom.root(), b);
        dom.append_child(dom.root(), c);

        compile_children(&dom, &store, dom.root());
        assert_eq!(dom.children(dom.root()), vec![a, b, c]);
    }
}
