//! Tree builder
//!
//! The `build(type, props, ...children)` factory that declarative syntax
//! lowers to. No validation happens here; a malformed node surfaces later
//! when it is materialized or reconciled.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{rc::Rc, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::rc::Rc;

use core::fmt;

use crate::node::{Child, Component, Element, PropMap, PropValue, Props, RenderFn, VNode, CHILDREN_KEY};

/// What `build` is asked to construct
#[derive(Clone)]
pub enum NodeType {
    /// Platform node kind (e.g. "div")
    Tag(String),
    /// Component render function with its type name
    Component { name: String, render: Rc<RenderFn> },
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        NodeType::Tag(String::from(tag))
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::Tag(tag)
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            NodeType::Component { name, .. } => f.debug_tuple("Component").field(name).finish(),
        }
    }
}

/// Declare a component type; clone the result to build it many times
pub fn component<F>(name: &str, render: F) -> NodeType
where
    F: Fn(&Props) -> VNode + 'static,
{
    NodeType::Component {
        name: String::from(name),
        render: Rc::new(render),
    }
}

/// Build a virtual node
///
/// A component type yields a `Component` node whose props carry `children`
/// flattened, replacing any `children` entry in the given props; absent
/// props become an empty map. A tag yields an `Element` with `children`
/// kept exactly as given.
pub fn build(node_type: impl Into<NodeType>, props: Option<PropMap>, children: Vec<Child>) -> VNode {
    let mut props = props.unwrap_or_default();
    match node_type.into() {
        NodeType::Component { name, render } => {
            props.remove(CHILDREN_KEY);
            VNode::Component(Component::new(&name, render, Props::new(props, flatten(children))))
        }
        NodeType::Tag(tag) => VNode::Element(Element {
            tag,
            props,
            children,
        }),
    }
}

/// Text node
pub fn text(value: impl Into<String>) -> VNode {
    VNode::Text(value.into())
}

/// Collect `(name, value)` pairs into a property map
pub fn props<I, K, V>(pairs: I) -> PropMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Expand one level of nested child lists
pub fn flatten(children: Vec<Child>) -> Vec<VNode> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Child::Node(node) => out.push(node),
            Child::List(nodes) => out.extend(nodes),
        }
    }
    out
}
