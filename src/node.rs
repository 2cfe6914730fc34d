//! Virtual tree model
//!
//! Immutable description of the desired UI shape. A tree is built fresh on
//! every render pass, compared against the previous one and thrown away;
//! nothing in here is ever mutated after construction.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap as HashMap, rc::Rc, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::HashMap;
#[cfg(feature = "std")]
use std::rc::Rc;

use core::fmt;

/// Property name reserved for component children; never set on a real node
pub const CHILDREN_KEY: &str = "children";

/// Event handler bound through a property (e.g. `onclick`)
///
/// Two handlers are equal only if they are the same allocation.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn()>);

impl Handler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler
    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Value of a single property
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// String attribute (e.g. `className`)
    Str(String),
    /// Integer attribute
    Int(i64),
    /// Float attribute; `NaN` never equals itself, so it is always re-set
    Float(f64),
    /// Boolean attribute (e.g. `disabled`)
    Bool(bool),
    /// Event handler binding
    Handler(Handler),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Float(v) => write!(f, "{v}"),
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(String::from(v))
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Int(i64::from(v))
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Float(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<Handler> for PropValue {
    fn from(v: Handler) -> Self {
        PropValue::Handler(v)
    }
}

/// Property name → value; insertion order is irrelevant
pub type PropMap = HashMap<String, PropValue>;

/// Props captured by a component node: its attributes plus the flattened
/// children it was constructed with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attrs: PropMap,
    children: Vec<VNode>,
}

impl Props {
    pub fn new(attrs: PropMap, children: Vec<VNode>) -> Self {
        Self { attrs, children }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    pub fn attrs(&self) -> &PropMap {
        &self.attrs
    }

    /// The reserved children entry
    pub fn children(&self) -> &[VNode] {
        &self.children
    }
}

/// Pure render function of a component
pub type RenderFn = dyn Fn(&Props) -> VNode;

/// Opaque node: a render function plus the props snapshot it was built with
///
/// Rendering must terminate in a text or element node. A component that
/// (directly or indirectly) renders itself forever exhausts the stack; no
/// cycle detection is performed, keeping it terminating is on the caller.
#[derive(Clone)]
pub struct Component {
    name: String,
    render: Rc<RenderFn>,
    props: Props,
}

impl Component {
    pub fn new(name: &str, render: Rc<RenderFn>, props: Props) -> Self {
        Self {
            name: String::from(name),
            render,
            props,
        }
    }

    /// Type name used when deciding whether two nodes are the same kind
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Evaluate with the stored props
    pub fn render(&self) -> VNode {
        (self.render)(&self.props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.render, &other.render) && self.props == other.props
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// Platform node description
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Target platform node kind (e.g. "div")
    pub tag: String,
    pub props: PropMap,
    /// Children as given at construction; a slot may hold a nested list
    pub children: Vec<Child>,
}

impl Element {
    /// Children with one level of nested lists expanded, in order
    pub fn flat_children(&self) -> Vec<&VNode> {
        let mut out = Vec::with_capacity(self.children.len());
        for child in &self.children {
            match child {
                Child::Node(node) => out.push(node),
                Child::List(nodes) => out.extend(nodes.iter()),
            }
        }
        out
    }
}

/// One child slot of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(VNode),
    List(Vec<VNode>),
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<Vec<VNode>> for Child {
    fn from(nodes: Vec<VNode>) -> Self {
        Child::List(nodes)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Node(VNode::Text(String::from(text)))
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Node(VNode::Text(text))
    }
}

/// Virtual tree node
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Text(String),
    Element(Element),
    Component(Component),
}

impl VNode {
    /// Tag of an element, name of a component, `None` for text
    pub fn type_name(&self) -> Option<&str> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(el) => Some(&el.tag),
            VNode::Component(c) => Some(c.name()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            VNode::Component(c) => Some(c),
            _ => None,
        }
    }
}
