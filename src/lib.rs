//! ALICE-VDOM — Virtual Tree Reconciliation
//!
//! Don't rebuild the tree, patch it.
//!
//! Builds an in-memory description of a UI, materializes it into real
//! display nodes, and on every state change applies only the mutations
//! needed to turn the previous tree into the new one:
//! - Text / element / component virtual nodes
//! - Positional (non-keyed) child diff with prop-level patching
//! - Pure functional components rendered from a props snapshot
//! - Explicit render store: one entry per mount point, full re-render on update
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`node`] | Virtual tree model (`VNode`, props, handlers) |
//! | [`builder`] | `build(type, props, children)` tree factory |
//! | [`platform`] | Adapter trait the core drives real nodes through |
//! | [`dom`] | In-memory adapter with a mutation journal |
//! | [`materialize`] | Virtual tree → real nodes, store-less `mount` |
//! | [`reconcile`] | Diff-and-patch of old vs new tree, prop merge-diff |
//! | [`store`] | Render store: mount points, state, `update_state` |
//! | [`error`] | Error type |
//!
//! # Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `std` | Enable `std` collections and `std` logging/error backends (default: `no_std` + `alloc`) |
//!
//! # Quick Start
//!
//! ```
//! use alice_vdom::{build, props, MemoryDom, Mutation, Platform, RenderStore};
//!
//! let mut dom = MemoryDom::new();
//! let container = dom.create_element("main").unwrap();
//! let mut store = RenderStore::new(dom);
//!
//! let app = |count: &i64| {
//!     build(
//!         "p",
//!         Some(props([("className", "counter")])),
//!         vec![format!("clicked {count} times").into()],
//!     )
//! };
//! store.render(app, container, 0).unwrap();
//! store.platform_mut().take_journal();
//!
//! // Only the text leaf is replaced
//! store.update_state(|count| count + 1).unwrap();
//! let replaces = store
//!     .platform()
//!     .journal()
//!     .iter()
//!     .filter(|m| matches!(m, Mutation::Replace { .. }))
//!     .count();
//! assert_eq!(replaces, 1);
//! assert_eq!(
//!     store.platform().markup(container),
//!     "<main><p className=\"counter\">clicked 1 times</p></main>"
//! );
//! ```
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod builder;
pub mod dom;
pub mod error;
pub mod materialize;
pub mod node;
pub mod platform;
pub mod reconcile;
pub mod store;

pub use builder::{build, component, flatten, props, text, NodeType};
pub use dom::{MemoryDom, Mutation, NodeId, RealKind, RealNode, UnsetPolicy};
pub use error::{Error, Result};
pub use materialize::{materialize, mount};
pub use node::{Child, Component, Element, Handler, PropMap, PropValue, Props, RenderFn, VNode, CHILDREN_KEY};
pub use platform::Platform;
pub use reconcile::{patch_props, reconcile, type_is_different};
pub use store::{AppFn, RenderStore};
