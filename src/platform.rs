//! Platform adapter boundary
//!
//! The core never touches a display tree directly; it drives one through
//! this capability set. Anything an adapter rejects comes back as
//! [`Error::Platform`](crate::Error::Platform) and is propagated unchanged.
//!
//! Author: Moroya Sakamoto

use core::fmt::Debug;

use crate::error::Result;
use crate::node::PropValue;

/// Capabilities the materializer and reconciler require from a display tree
pub trait Platform {
    /// Handle to a real node; equality is node identity, ordering decides the
    /// order mount points are updated in
    type Node: Clone + Ord + Debug;

    fn create_text_node(&mut self, value: &str) -> Result<Self::Node>;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Put `new_child` where `old_child` sits under `parent`
    fn replace_child(
        &mut self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> Result<()>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

    /// `None` clears or unbinds the property; how is up to the adapter
    fn set_property(&mut self, node: &Self::Node, name: &str, value: Option<&PropValue>) -> Result<()>;

    /// Discard whatever currently lives under a mount point
    fn clear_content(&mut self, node: &Self::Node) -> Result<()>;
}
