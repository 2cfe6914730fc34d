//! In-memory display tree
//!
//! Reference [`Platform`] adapter: flat node storage with O(1) ID lookup,
//! a parent index, and a journal of every mutation applied. Hosts without a
//! real display tree (tests, headless rendering) drive this directly.
//!
//! The journal grows with every mutation until drained with
//! [`MemoryDom::take_journal`]; long-running hosts either drain it after each
//! pass or turn it off with [`MemoryDom::with_journal`]. Nodes created but
//! never attached (e.g. by a render that failed halfway) stay allocated until
//! [`MemoryDom::collect_garbage`] sweeps them.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{
    collections::{BTreeMap as HashMap, BTreeSet as HashSet},
    format,
    string::String,
    vec::Vec,
};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use core::fmt::Write as _;

use crate::error::{Error, Result};
use crate::node::PropValue;
use crate::platform::Platform;

/// Unique real-node identifier
pub type NodeId = u32;

/// What a real node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealKind {
    Text(String),
    Element(String),
}

/// How `set_property(name, None)` is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsetPolicy {
    /// Delete the property from the node
    #[default]
    Remove,
    /// Keep the name with an explicit undefined value
    Assign,
}

/// Real node
#[derive(Debug, Clone)]
pub struct RealNode {
    pub id: NodeId,
    pub kind: RealKind,
    /// `None` is an explicitly assigned undefined (see [`UnsetPolicy::Assign`])
    pub props: HashMap<String, Option<PropValue>>,
    pub children: Vec<NodeId>,
}

impl RealNode {
    fn new(id: NodeId, kind: RealKind) -> Self {
        Self {
            id,
            kind,
            props: HashMap::new(),
            children: Vec::new(),
        }
    }
}

/// One applied mutation, in application order
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateText {
        node_id: NodeId,
        value: String,
    },
    CreateElement {
        node_id: NodeId,
        tag: String,
    },
    Append {
        parent_id: NodeId,
        child_id: NodeId,
    },
    Replace {
        parent_id: NodeId,
        new_id: NodeId,
        old_id: NodeId,
    },
    Remove {
        parent_id: NodeId,
        child_id: NodeId,
    },
    SetProperty {
        node_id: NodeId,
        name: String,
        value: Option<PropValue>,
    },
    Clear {
        node_id: NodeId,
    },
}

impl Mutation {
    /// Anything but a property write
    pub fn is_structural(&self) -> bool {
        !matches!(self, Mutation::SetProperty { .. })
    }
}

/// In-memory display tree
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    nodes: Vec<RealNode>,
    /// Maps NodeId → index in `nodes`
    index: HashMap<NodeId, usize>,
    /// Maps child NodeId → parent NodeId
    parent_index: HashMap<NodeId, NodeId>,
    next_id: NodeId,
    journal: Vec<Mutation>,
    journal_off: bool,
    unset_policy: UnsetPolicy,
    rejected: HashSet<String>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unset_policy(mut self, policy: UnsetPolicy) -> Self {
        self.unset_policy = policy;
        self
    }

    /// Record mutations in the journal (on by default)
    pub fn with_journal(mut self, enabled: bool) -> Self {
        self.journal_off = !enabled;
        self
    }

    /// Make `set_property` fail for `name`
    pub fn reject_property(mut self, name: &str) -> Self {
        self.rejected.insert(String::from(name));
        self
    }

    /// Get node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&RealNode> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut RealNode> {
        self.index.get(&id).map(|&idx| &mut self.nodes[idx])
    }

    /// Live node count, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parent_index.get(&id).copied()
    }

    /// Children of `id`; empty for unknown IDs
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Property value; `None` when absent or explicitly undefined
    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.get_node(id)
            .and_then(|n| n.props.get(name))
            .and_then(Option::as_ref)
    }

    /// Whether the name is present at all, undefined included
    pub fn has_property(&self, id: NodeId, name: &str) -> bool {
        self.get_node(id).is_some_and(|n| n.props.contains_key(name))
    }

    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match &self.get_node(id)?.kind {
            RealKind::Text(s) => Some(s),
            RealKind::Element(_) => None,
        }
    }

    pub fn tag_of(&self, id: NodeId) -> Option<&str> {
        match &self.get_node(id)?.kind {
            RealKind::Element(tag) => Some(tag),
            RealKind::Text(_) => None,
        }
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the journal, e.g. between a first paint and an update
    pub fn take_journal(&mut self) -> Vec<Mutation> {
        core::mem::take(&mut self.journal)
    }

    fn record(&mut self, mutation: Mutation) {
        if !self.journal_off {
            self.journal.push(mutation);
        }
    }

    fn alloc(&mut self, kind: RealKind) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let idx = self.nodes.len();
        self.nodes.push(RealNode::new(id, kind));
        self.index.insert(id, idx);
        id
    }

    fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.get_node(parent)?.children.iter().position(|&c| c == child)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old_parent) = self.parent_index.remove(&id) {
            if let Some(parent) = self.get_node_mut(old_parent) {
                parent.children.retain(|&c| c != id);
            }
        }
    }

    fn require(&self, op: &'static str, id: NodeId) -> Result<&RealNode> {
        self.get_node(id)
            .ok_or_else(|| Error::platform(op, format!("unknown node {id}")))
    }

    /// Remove a node and all its descendants
    pub fn remove_subtree(&mut self, id: NodeId) {
        let mut to_remove_vec = Vec::new();
        self.collect_subtree(id, &mut to_remove_vec);
        let to_remove: HashSet<NodeId> = to_remove_vec.into_iter().collect();

        self.detach(id);
        for rid in &to_remove {
            self.parent_index.remove(rid);
        }

        self.nodes.retain(|n| !to_remove.contains(&n.id));
        self.index.clear();
        for (idx, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, idx);
        }
    }

    /// Mark-sweep: drop every node not reachable from `roots`
    ///
    /// Roots are typically the mount containers. Returns the number of nodes
    /// collected. Sweeping is bookkeeping, not a mutation, and is not
    /// journaled.
    pub fn collect_garbage(&mut self, roots: &[NodeId]) -> usize {
        let mut reachable = HashSet::new();
        for &root in roots {
            if self.get_node(root).is_some() {
                let mut ids = Vec::new();
                self.collect_subtree(root, &mut ids);
                reachable.extend(ids);
            }
        }

        let total_before = self.nodes.len();
        self.nodes.retain(|n| reachable.contains(&n.id));
        self.parent_index
            .retain(|child, parent| reachable.contains(child) && reachable.contains(parent));
        self.index.clear();
        for (idx, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, idx);
        }
        total_before - self.nodes.len()
    }

    fn collect_subtree(&self, id: NodeId, result: &mut Vec<NodeId>) {
        result.push(id);
        if let Some(node) = self.get_node(id) {
            for &child_id in &node.children {
                self.collect_subtree(child_id, result);
            }
        }
    }

    /// Structural hash of a subtree (FNV-1a over kind, tag/text, children)
    ///
    /// Properties are not hashed; two subtrees with equal hashes have the
    /// same shape.
    pub fn subtree_hash(&self, id: NodeId) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        self.hash_node(id, &mut h);
        h
    }

    fn hash_node(&self, id: NodeId, h: &mut u64) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (tag, bytes) = match &node.kind {
            RealKind::Text(s) => (1u64, s.as_bytes()),
            RealKind::Element(t) => (2u64, t.as_bytes()),
        };
        *h ^= tag;
        *h = h.wrapping_mul(0x100000001b3);
        for &b in bytes {
            *h ^= u64::from(b);
            *h = h.wrapping_mul(0x100000001b3);
        }
        // length marker keeps [a,b] and [ab] apart
        *h ^= node.children.len() as u64;
        *h = h.wrapping_mul(0x100000001b3);
        for &child_id in &node.children {
            self.hash_node(child_id, h);
        }
    }

    /// Markup dump of a subtree, properties sorted by name, undefined skipped
    pub fn markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        match &node.kind {
            RealKind::Text(s) => out.push_str(s),
            RealKind::Element(tag) => {
                let mut names: Vec<_> = node
                    .props
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k, v)))
                    .collect();
                names.sort_by(|a, b| a.0.cmp(b.0));
                out.push('<');
                out.push_str(tag);
                for (name, value) in names {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

impl Platform for MemoryDom {
    type Node = NodeId;

    fn create_text_node(&mut self, value: &str) -> Result<NodeId> {
        let node_id = self.alloc(RealKind::Text(String::from(value)));
        self.record(Mutation::CreateText {
            node_id,
            value: String::from(value),
        });
        Ok(node_id)
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        if tag.is_empty() || tag.contains(char::is_whitespace) {
            return Err(Error::platform("create_element", format!("invalid tag {tag:?}")));
        }
        let node_id = self.alloc(RealKind::Element(String::from(tag)));
        self.record(Mutation::CreateElement {
            node_id,
            tag: String::from(tag),
        });
        Ok(node_id)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        let (parent, child) = (*parent, *child);
        if matches!(self.require("append_child", parent)?.kind, RealKind::Text(_)) {
            return Err(Error::platform("append_child", "text nodes cannot have children"));
        }
        self.require("append_child", child)?;
        self.detach(child);
        if let Some(p) = self.get_node_mut(parent) {
            p.children.push(child);
        }
        self.parent_index.insert(child, parent);
        self.record(Mutation::Append {
            parent_id: parent,
            child_id: child,
        });
        Ok(())
    }

    fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) -> Result<()> {
        let (parent, new_id, old_id) = (*parent, *new_child, *old_child);
        self.require("replace_child", new_id)?;
        let not_a_child = || {
            Error::platform(
                "replace_child",
                format!("node {old_id} is not a child of {parent}"),
            )
        };
        if new_id == old_id || self.position_of(parent, old_id).is_none() {
            return Err(not_a_child());
        }
        self.detach(new_id);
        // position may shift if new_id was an earlier sibling
        let pos = self.position_of(parent, old_id).ok_or_else(not_a_child)?;
        if let Some(p) = self.get_node_mut(parent) {
            p.children[pos] = new_id;
        }
        self.parent_index.insert(new_id, parent);
        self.parent_index.remove(&old_id);
        self.remove_subtree(old_id);
        self.record(Mutation::Replace {
            parent_id: parent,
            new_id,
            old_id,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        let (parent, child) = (*parent, *child);
        if self.position_of(parent, child).is_none() {
            return Err(Error::platform(
                "remove_child",
                format!("node {child} is not a child of {parent}"),
            ));
        }
        self.remove_subtree(child);
        self.record(Mutation::Remove {
            parent_id: parent,
            child_id: child,
        });
        Ok(())
    }

    fn child_at(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
        self.children(*parent).get(index).copied()
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: Option<&PropValue>) -> Result<()> {
        let node_id = *node;
        if name.is_empty() || self.rejected.contains(name) {
            return Err(Error::platform("set_property", format!("invalid property {name:?}")));
        }
        let policy = self.unset_policy;
        let real = self
            .get_node_mut(node_id)
            .ok_or_else(|| Error::platform("set_property", format!("unknown node {node_id}")))?;
        match (value, policy) {
            (Some(v), _) => {
                real.props.insert(String::from(name), Some(v.clone()));
            }
            (None, UnsetPolicy::Assign) => {
                real.props.insert(String::from(name), None);
            }
            (None, UnsetPolicy::Remove) => {
                real.props.remove(name);
            }
        }
        self.record(Mutation::SetProperty {
            node_id,
            name: String::from(name),
            value: value.cloned(),
        });
        Ok(())
    }

    fn clear_content(&mut self, node: &NodeId) -> Result<()> {
        let node_id = *node;
        let children = self.require("clear_content", node_id)?.children.clone();
        for child in children {
            self.remove_subtree(child);
        }
        self.record(Mutation::Clear { node_id });
        Ok(())
    }
}
