//! Reconciler
//!
//! Applies the mutations that turn the real subtree built from `old` into
//! one matching `new`:
//! 1. New node only → materialize and append
//! 2. Old node only → remove
//! 3. Different type (kind, tag, component name, or text value) → replace
//! 4. Components → compare what both render
//! 5. Same element → patch props, then recurse into children by index
//! 6. Equal text → nothing
//!
//! Children are matched purely by position. Inserting or removing an item
//! in the middle of a list shows up as changes at every later index, never
//! as a move.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeSet as HashSet, string::String};
#[cfg(feature = "std")]
use std::collections::HashSet;

use core::mem::discriminant;

use tracing::trace;

use crate::error::{Error, Result};
use crate::materialize::materialize;
use crate::node::{PropMap, VNode, CHILDREN_KEY};
use crate::platform::Platform;

/// True if `old` cannot be patched into `new` in place
///
/// Nodes differ when their variants differ, when their tag or component
/// name differs, or when both are text with different values.
pub fn type_is_different(old: &VNode, new: &VNode) -> bool {
    if discriminant(old) != discriminant(new) {
        return true;
    }
    match (old, new) {
        (VNode::Text(a), VNode::Text(b)) => a != b,
        _ => old.type_name() != new.type_name(),
    }
}

/// Reconcile `old` against `new` at child `index` of `parent`
///
/// The real child at `index` is looked up once and must exist whenever
/// `old` does.
pub fn reconcile<P: Platform>(
    platform: &mut P,
    old: Option<&VNode>,
    new: Option<&VNode>,
    parent: &P::Node,
    index: usize,
) -> Result<()> {
    let (old, new) = match (old, new) {
        (None, None) => return Ok(()),
        (None, Some(new)) => {
            trace!(index, "append");
            let real = materialize(platform, new)?;
            return platform.append_child(parent, &real);
        }
        (Some(_), None) => {
            trace!(index, "remove");
            let old_real = child_at(platform, parent, index)?;
            return platform.remove_child(parent, &old_real);
        }
        (Some(old), Some(new)) => (old, new),
    };

    let old_real = child_at(platform, parent, index)?;

    if type_is_different(old, new) {
        trace!(index, old = ?old.type_name(), new = ?new.type_name(), "replace");
        let real = materialize(platform, new)?;
        return platform.replace_child(parent, &real, &old_real);
    }

    match (old, new) {
        (VNode::Component(old_component), VNode::Component(new_component)) => {
            trace!(index, component = new_component.name(), "render component");
            let old_rendered = old_component.render();
            let new_rendered = new_component.render();
            reconcile(platform, Some(&old_rendered), Some(&new_rendered), parent, index)
        }
        (VNode::Element(old_el), VNode::Element(new_el)) => {
            patch_props(platform, &old_el.props, &new_el.props, &old_real)?;

            let old_children = old_el.flat_children();
            let new_children = new_el.flat_children();
            for (i, new_child) in new_children.iter().copied().enumerate() {
                reconcile(platform, old_children.get(i).copied(), Some(new_child), &old_real, i)?;
            }
            // surplus old children go last-first so lower indices stay valid
            for i in (new_children.len()..old_children.len()).rev() {
                reconcile(platform, Some(old_children[i]), None, &old_real, i)?;
            }
            Ok(())
        }
        // equal text
        _ => Ok(()),
    }
}

fn child_at<P: Platform>(platform: &P, parent: &P::Node, index: usize) -> Result<P::Node> {
    platform
        .child_at(parent, index)
        .ok_or(Error::DetachedNode { index })
}

/// Set every property whose value changed between `old` and `new`
///
/// A name present on only one side counts as changed; a name missing from
/// `new` is set to `None`, which is how bindings get removed.
pub fn patch_props<P: Platform>(
    platform: &mut P,
    old: &PropMap,
    new: &PropMap,
    node: &P::Node,
) -> Result<()> {
    let names: HashSet<&String> = old.keys().chain(new.keys()).collect();
    for name in names {
        if name == CHILDREN_KEY {
            continue;
        }
        let new_value = new.get(name);
        if old.get(name) != new_value {
            trace!(prop = %name, cleared = new_value.is_none(), "patch prop");
            platform.set_property(node, name, new_value)?;
        }
    }
    Ok(())
}
