//! Render store
//!
//! Explicit render context: owns the platform adapter, one entry per mount
//! point (current tree plus the component function that produced it) and
//! the application state. Every state update re-renders every mount point;
//! there is no dependency tracking.
//!
//! Calls take `&mut self`, so a store is driven by one writer at a time. A
//! multi-threaded host must queue `render`/`update_state` calls onto the
//! thread owning the store.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, rc::Rc, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::rc::Rc;

use core::fmt;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::materialize::mount;
use crate::node::VNode;
use crate::platform::Platform;
use crate::reconcile::reconcile;

/// Application component: state in, virtual tree out
pub type AppFn<S> = dyn Fn(&S) -> VNode;

/// What the store remembers about one mount point
struct RenderEntry<S> {
    /// Tree currently reflected under the mount point
    tree: VNode,
    component: Rc<AppFn<S>>,
}

/// Render store
///
/// Mount points are kept ordered, so an update visits them in ascending
/// handle order.
pub struct RenderStore<S, P: Platform> {
    platform: P,
    entries: BTreeMap<P::Node, RenderEntry<S>>,
    state: Option<S>,
}

impl<S, P: Platform> RenderStore<S, P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            entries: BTreeMap::new(),
            state: None,
        }
    }

    /// First paint (or re-mount) of `component` under `mount_point`
    ///
    /// Replaces whatever the mount point held, upserts its entry and makes
    /// `initial_state` the current state.
    pub fn render<F>(&mut self, component: F, mount_point: P::Node, initial_state: S) -> Result<()>
    where
        F: Fn(&S) -> VNode + 'static,
    {
        let tree = component(&initial_state);
        mount(&mut self.platform, &tree, &mount_point)?;
        debug!(mount = ?mount_point, mounts = self.entries.len() + 1, "rendered");
        self.entries.insert(
            mount_point,
            RenderEntry {
                tree,
                component: Rc::new(component),
            },
        );
        self.state = Some(initial_state);
        Ok(())
    }

    /// Derive the next state and re-render every mount point against it
    ///
    /// Mount points are reconciled in ascending order. On failure the error
    /// is returned as-is; mount points reconciled before it keep their new
    /// trees, the failing one and any after it keep their old trees, and the
    /// state is left unchanged.
    pub fn update_state<F>(&mut self, update: F) -> Result<()>
    where
        F: FnOnce(&S) -> S,
    {
        let current = self.state.as_ref().ok_or(Error::NoState)?;
        let new_state = update(current);
        debug!(mounts = self.entries.len(), "updating state");

        for (mount_point, entry) in &mut self.entries {
            let new_tree = (entry.component)(&new_state);
            reconcile(&mut self.platform, Some(&entry.tree), Some(&new_tree), mount_point, 0)
                .inspect_err(|e| warn!(mount = ?mount_point, error = %e, "update aborted"))?;
            entry.tree = new_tree;
        }

        self.state = Some(new_state);
        Ok(())
    }

    /// Current application state; `None` before the first render
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    /// Tree currently reflected under `mount_point`
    pub fn tree(&self, mount_point: &P::Node) -> Option<&VNode> {
        self.entries.get(mount_point).map(|e| &e.tree)
    }

    pub fn contains(&self, mount_point: &P::Node) -> bool {
        self.entries.contains_key(mount_point)
    }

    /// Number of mount points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }
}

impl<S, P: Platform + fmt::Debug> fmt::Debug for RenderStore<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderStore")
            .field("platform", &self.platform)
            .field("mounts", &self.entries.keys().collect::<Vec<_>>())
            .field("has_state", &self.state.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "std"))]
    use alloc::{format, string::String, vec};
    use crate::builder::{build, component, props, text};
    use crate::dom::{MemoryDom, Mutation, NodeId};
    use crate::materialize::materialize;
    use crate::node::{Child, Handler, PropValue, Props};

    #[derive(Debug, Clone, PartialEq)]
    struct AppState {
        color: &'static str,
        bold_text: String,
        count: i64,
        is_bold: bool,
    }

    fn initial_state() -> AppState {
        AppState {
            color: "green",
            bold_text: String::from("Never updated!"),
            count: 0,
            is_bold: true,
        }
    }

    fn on_click(state: &AppState) -> AppState {
        let count = state.count + 1;
        AppState {
            color: if state.color == "green" { "black" } else { "green" },
            bold_text: format!("Updated {count} times!"),
            count,
            is_bold: false,
        }
    }

    fn application(handler: Handler) -> impl Fn(&AppState) -> VNode + 'static {
        let panel = component("Panel", |p: &Props| {
            let class = if p.get_bool("isBold").unwrap_or(false) { "bold" } else { "" };
            build(
                "div",
                None,
                vec![
                    Child::from(p.get_str("text").unwrap_or_default()),
                    build("div", Some(props([("className", class)])), vec![Child::List(p.children().to_vec())]).into(),
                ],
            )
        });
        move |state: &AppState| {
            build(
                "div",
                Some(props([("className", "virtual-div")])),
                vec![
                    build(
                        "b",
                        Some(props([("className", format!("text-{}", state.color))])),
                        vec![Child::from(state.bold_text.as_str())],
                    )
                    .into(),
                    build(
                        "div",
                        None,
                        vec![build(
                            "button",
                            Some(props([("onclick", PropValue::Handler(handler.clone()))])),
                            vec!["Update".into()],
                        )
                        .into()],
                    )
                    .into(),
                    build(
                        panel.clone(),
                        Some(props([
                            ("text", PropValue::from(state.bold_text.as_str())),
                            ("isBold", PropValue::Bool(state.is_bold)),
                        ])),
                        vec![
                            build("span", None, vec!["Hey!".into()]).into(),
                            build("span", None, vec!["Yo!".into()]).into(),
                        ],
                    )
                    .into(),
                ],
            )
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn store_with_mount() -> (RenderStore<AppState, MemoryDom>, NodeId) {
        init_tracing();
        let mut dom = MemoryDom::new();
        let container = dom.create_element("section").unwrap();
        (RenderStore::new(dom), container)
    }

    fn expected_markup(state: &AppState, handler: &Handler) -> String {
        let mut dom = MemoryDom::new();
        let id = materialize(&mut dom, &application(handler.clone())(state)).unwrap();
        dom.markup(id)
    }

    fn expected_shape(state: &AppState, handler: &Handler) -> u64 {
        let mut dom = MemoryDom::new();
        let id = materialize(&mut dom, &application(handler.clone())(state)).unwrap();
        dom.subtree_hash(id)
    }

    #[test]
    fn test_render_registers_entry_and_state() {
        let handler = Handler::new(|| {});
        let (mut store, container) = store_with_mount();
        assert!(store.is_empty());
        assert!(store.state().is_none());

        store.render(application(handler.clone()), container, initial_state()).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.contains(&container));
        assert_eq!(store.state(), Some(&initial_state()));
        assert!(store.tree(&container).is_some());
        let dom = store.platform();
        assert_eq!(dom.children(container).len(), 1);
        assert_eq!(
            dom.markup(dom.children(container)[0]),
            expected_markup(&initial_state(), &handler)
        );
    }

    #[test]
    fn test_render_clears_existing_content() {
        let (mut store, container) = store_with_mount();
        let dom = store.platform_mut();
        let stale = dom.create_text_node("loading...").unwrap();
        dom.append_child(&container, &stale).unwrap();

        store.render(|_: &AppState| text("ready"), container, initial_state()).unwrap();
        assert_eq!(store.platform().markup(container), "<section>ready</section>");
    }

    #[test]
    fn test_rerender_same_mount_upserts() {
        let (mut store, container) = store_with_mount();
        store.render(|_: &AppState| text("first"), container, initial_state()).unwrap();
        store.render(|_: &AppState| text("second"), container, initial_state()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.tree(&container), Some(&text("second")));
        assert_eq!(store.platform().markup(container), "<section>second</section>");
    }

    #[test]
    fn test_update_state_before_render_fails() {
        let (mut store, _) = store_with_mount();
        let err = store.update_state(on_click).unwrap_err();
        assert_eq!(err, Error::NoState);
    }

    #[test]
    fn test_update_state_twice_composes() {
        let handler = Handler::new(|| {});
        let (mut store, container) = store_with_mount();
        store.render(application(handler.clone()), container, initial_state()).unwrap();

        store.update_state(on_click).unwrap();
        store.update_state(on_click).unwrap();

        let expected_state = on_click(&on_click(&initial_state()));
        assert_eq!(store.state(), Some(&expected_state));
        assert_eq!(store.state().unwrap().color, "green");
        assert_eq!(store.state().unwrap().bold_text, "Updated 2 times!");
        let dom = store.platform();
        let root = dom.children(container)[0];
        assert_eq!(dom.subtree_hash(root), expected_shape(&expected_state, &handler));
        assert_eq!(dom.markup(root), expected_markup(&expected_state, &handler));
    }

    #[test]
    fn test_update_patches_in_place() {
        let handler = Handler::new(|| {});
        let (mut store, container) = store_with_mount();
        store.render(application(handler), container, initial_state()).unwrap();
        let root = store.platform().children(container)[0];
        store.platform_mut().take_journal();

        store.update_state(on_click).unwrap();

        let dom = store.platform();
        // root element survives; only leaves and props change
        assert_eq!(dom.children(container), &[root]);
        assert!(!dom
            .journal()
            .iter()
            .any(|m| matches!(m, Mutation::Replace { parent_id, .. } if *parent_id == container)));
        let b = dom.children(root)[0];
        assert_eq!(dom.property(b, "className"), Some(&PropValue::from("text-black")));
        // the stable handler is never re-bound
        assert!(!dom
            .journal()
            .iter()
            .any(|m| matches!(m, Mutation::SetProperty { name, .. } if name == "onclick")));
    }

    #[test]
    fn test_update_re_renders_every_mount_point() {
        init_tracing();
        let mut dom = MemoryDom::new();
        let left = dom.create_element("aside").unwrap();
        let right = dom.create_element("aside").unwrap();
        let mut store = RenderStore::new(dom);

        store
            .render(|s: &AppState| text(format!("L{}", s.count)), left, initial_state())
            .unwrap();
        store
            .render(|s: &AppState| text(format!("R{}", s.count)), right, initial_state())
            .unwrap();
        store.update_state(on_click).unwrap();

        let dom = store.platform();
        assert_eq!(dom.markup(left), "<aside>L1</aside>");
        assert_eq!(dom.markup(right), "<aside>R1</aside>");
        assert_eq!(store.tree(&left), Some(&text("L1")));
        assert_eq!(store.tree(&right), Some(&text("R1")));
    }

    #[test]
    fn test_update_failure_keeps_state() {
        init_tracing();
        let mut dom = MemoryDom::new().reject_property("innerHTML");
        let container = dom.create_element("section").unwrap();
        let mut store = RenderStore::new(dom);
        store
            .render(
                |s: &AppState| {
                    if s.count == 0 {
                        build("div", None, vec![])
                    } else {
                        build("div", Some(props([("innerHTML", "<b>")])), vec![])
                    }
                },
                container,
                initial_state(),
            )
            .unwrap();

        let err = store.update_state(on_click).unwrap_err();
        assert!(matches!(err, Error::Platform { op: "set_property", .. }));
        assert_eq!(store.state(), Some(&initial_state()));
        assert_eq!(store.tree(&container), Some(&build("div", None, vec![])));
    }

    #[test]
    fn test_update_failure_on_one_of_two_mounts() {
        init_tracing();
        let mut dom = MemoryDom::new().reject_property("innerHTML");
        let first = dom.create_element("aside").unwrap();
        let second = dom.create_element("aside").unwrap();
        let mut store = RenderStore::new(dom);

        store
            .render(|s: &AppState| text(format!("ok {}", s.count)), first, initial_state())
            .unwrap();
        store
            .render(
                |s: &AppState| {
                    if s.count == 0 {
                        build("div", None, vec![])
                    } else {
                        build("div", Some(props([("innerHTML", "<b>")])), vec![])
                    }
                },
                second,
                initial_state(),
            )
            .unwrap();

        let err = store.update_state(on_click).unwrap_err();
        assert!(matches!(err, Error::Platform { op: "set_property", .. }));
        assert_eq!(store.state(), Some(&initial_state()));
        // the lower mount point was reconciled before the failure
        assert_eq!(store.tree(&first), Some(&text("ok 1")));
        assert_eq!(store.platform().markup(first), "<aside>ok 1</aside>");
        assert_eq!(store.tree(&second), Some(&build("div", None, vec![])));
        assert_eq!(store.platform().markup(second), "<aside><div></div></aside>");
    }

    #[test]
    fn test_render_failure_registers_nothing() {
        let (mut store, container) = store_with_mount();
        let err = store
            .render(|_: &AppState| build("", None, vec![]), container, initial_state())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTree(_)));
        assert!(store.is_empty());
        assert!(store.state().is_none());
    }

    #[test]
    fn test_into_platform_returns_tree() {
        let (mut store, container) = store_with_mount();
        store.render(|_: &AppState| text("x"), container, initial_state()).unwrap();
        let dom = store.into_platform();
        assert_eq!(dom.markup(container), "<section>x</section>");
    }
}
