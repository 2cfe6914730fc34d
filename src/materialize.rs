//! Materializer
//!
//! Turns a virtual tree into real nodes through a [`Platform`].
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::string::String;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::node::{VNode, CHILDREN_KEY};
use crate::platform::Platform;

/// Create the real subtree for `node`
///
/// Components are rendered with their stored props and the result is
/// materialized in their place. Element children are appended in flattened
/// order before the element's properties are set.
pub fn materialize<P: Platform>(platform: &mut P, node: &VNode) -> Result<P::Node> {
    match node {
        VNode::Text(value) => platform.create_text_node(value),
        VNode::Component(component) => {
            trace!(component = component.name(), "rendering component");
            materialize(platform, &component.render())
        }
        VNode::Element(element) => {
            if element.tag.is_empty() {
                return Err(Error::MalformedTree(String::from("element without a tag")));
            }
            let real = platform.create_element(&element.tag)?;
            for child in element.flat_children() {
                let real_child = materialize(platform, child)?;
                platform.append_child(&real, &real_child)?;
            }
            for (name, value) in &element.props {
                if name == CHILDREN_KEY {
                    continue;
                }
                platform.set_property(&real, name, Some(value))?;
            }
            Ok(real)
        }
    }
}

/// First paint without a store: materialize `tree`, wipe `container` and
/// attach the result as its only child
pub fn mount<P: Platform>(platform: &mut P, tree: &VNode, container: &P::Node) -> Result<P::Node> {
    let real = materialize(platform, tree).inspect_err(|e| warn!(error = %e, "materialize failed"))?;
    platform.clear_content(container)?;
    platform.append_child(container, &real)?;
    debug!(?container, "mounted");
    Ok(real)
}
