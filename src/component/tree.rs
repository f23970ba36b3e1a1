//! Component tree.
//!
//! A [`Node`] is a component plus its children. Each child carries bounds
//! relative to its parent, so the regions of one render pass form a tree
//! matching this one. Structural operations are plain depth-first walks.

use super::{ComponentRef, FocusCandidate, RenderContext, Renderable, focus_info_of, with_component};
use crate::state::focus::FocusScope;
use crate::types::Region;

/// One node of a component tree.
pub struct Node {
    id: String,
    bounds: Region,
    component: Option<ComponentRef>,
    children: Vec<Node>,
}

impl Node {
    /// A node rendering `component` at `bounds` (relative to its parent).
    pub fn new(id: impl Into<String>, component: ComponentRef, bounds: Region) -> Self {
        Self {
            id: id.into(),
            bounds,
            component: Some(component),
            children: Vec::new(),
        }
    }

    /// A node that only groups children.
    pub fn container(id: impl Into<String>, bounds: Region) -> Self {
        Self {
            id: id.into(),
            bounds,
            component: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Region {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Region) {
        self.bounds = bounds;
    }

    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Remove the first descendant with `id` (depth-first).
    pub fn remove_child(&mut self, id: &str) -> Option<Node> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|c| c.remove_child(id))
    }

    /// Find this node or a descendant by id (depth-first, pre-order).
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Focusable nodes of this subtree in depth-first pre-order.
    ///
    /// Deterministic: the same tree always yields the same order.
    pub fn focusable_components(&self) -> Vec<FocusCandidate> {
        let mut out = Vec::new();
        self.collect_focusable(&mut out);
        out
    }

    fn collect_focusable(&self, out: &mut Vec<FocusCandidate>) {
        let info = self.component.as_ref().and_then(focus_info_of);
        if let Some(info) = info.filter(|i| i.focusable) {
            out.push(FocusCandidate {
                id: self.id.clone(),
                info,
            });
        }
        for child in &self.children {
            child.collect_focusable(out);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render this node into `ctx`, then each child into its own region.
    pub fn render_tree(&self, ctx: &mut RenderContext<'_>) {
        if let Some(component) = &self.component {
            with_component(component, &self.id, "render", |c| c.render(ctx));
        }
        for child in &self.children {
            let mut child_ctx = ctx.child(child.bounds, &child.id);
            child.render_tree(&mut child_ctx);
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl FocusScope for Node {
    fn focus_candidates(&self, trap: Option<&str>) -> Vec<FocusCandidate> {
        match trap {
            Some(id) => self.find_by_id(id).map(Node::focusable_components).unwrap_or_default(),
            None => self.focusable_components(),
        }
    }

    fn component(&self, id: &str) -> Option<ComponentRef> {
        self.find_by_id(id)?.component.clone()
    }
}

/// A whole tree can be registered with the screen as one component.
impl Renderable for Node {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        self.render_tree(ctx);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{FocusInfo, RenderTrigger};
    use crate::renderer::ScreenBuffer;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Label {
        text: &'static str,
        focus: FocusInfo,
    }

    impl Renderable for Label {
        fn render(&mut self, ctx: &mut RenderContext<'_>) {
            let marker = if ctx.is_focused() { ">" } else { "" };
            ctx.write(&format!("{marker}{}", self.text), 0, 0, None);
        }

        fn focus_info(&self) -> FocusInfo {
            self.focus
        }
    }

    fn label(id: &str, text: &'static str, focus: FocusInfo, bounds: Region) -> Node {
        Node::new(id, Rc::new(RefCell::new(Label { text, focus })), bounds)
    }

    fn sample() -> Node {
        Node::container("root", Region::new(0, 0, 20, 4))
            .with_child(
                Node::container("panel", Region::new(0, 0, 10, 4))
                    .with_child(label("a", "A", FocusInfo::focusable(), Region::new(0, 0, 5, 1)))
                    .with_child(label("b", "B", FocusInfo::default(), Region::new(0, 1, 5, 1))),
            )
            .with_child(label("c", "C", FocusInfo::focusable().with_tab_index(3), Region::new(10, 0, 5, 1)))
    }

    fn ids(candidates: &[FocusCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_find_by_id() {
        let tree = sample();
        assert_eq!(tree.find_by_id("b").map(Node::id), Some("b"));
        assert_eq!(tree.find_by_id("root").map(Node::id), Some("root"));
        assert!(tree.find_by_id("zzz").is_none());
    }

    #[test]
    fn test_focusable_components_preorder_and_stable() {
        let tree = sample();
        let first = tree.focusable_components();
        assert_eq!(ids(&first), vec!["a", "c"]);
        assert_eq!(tree.focusable_components(), first);
    }

    #[test]
    fn test_remove_child_searches_descendants() {
        let mut tree = sample();
        let removed = tree.remove_child("a").unwrap();
        assert_eq!(removed.id(), "a");
        assert!(tree.find_by_id("a").is_none());
        assert!(tree.remove_child("a").is_none());
    }

    #[test]
    fn test_trap_scope_is_subtree() {
        let tree = sample();
        assert_eq!(ids(&tree.focus_candidates(Some("panel"))), vec!["a"]);
        assert_eq!(ids(&tree.focus_candidates(None)), vec!["a", "c"]);
        assert!(tree.focus_candidates(Some("missing")).is_empty());
        assert!(FocusScope::component(&tree, "c").is_some());
        assert!(FocusScope::component(&tree, "panel").is_none());
    }

    #[test]
    fn test_render_tree_uses_child_regions() {
        let tree = sample();
        let mut buf = ScreenBuffer::new(20, 4);
        let trigger = RenderTrigger::new();
        let mut ctx = RenderContext::new(&mut buf, Region::new(0, 0, 20, 4), "root", Some("c"), None, &trigger);
        tree.render_tree(&mut ctx);
        drop(ctx);
        assert_eq!(buf.row_text(0), "A         >C        ");
        assert_eq!(buf.row_text(1), "B                   ");
    }
}
