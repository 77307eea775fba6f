//! Element tree storage
//!
//! Elements live in a slotmap keyed by [`NodeId`]. The tree owns every
//! element and is the only way to change one after insertion; each setter
//! pushes the paint invalidation and layout request its change implies.

use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use thiserror::Error;
use veneer_core::{Padding, Point, Rect};

use crate::capability::{ElementView, HitTestable, Layoutable, Paintable};
use crate::element::Element;
use crate::event_handler::{EventContext, EventHandlers};
use crate::invalidation::Invalidator;
use crate::layout::{Anchor, Dock, LayoutState};
use crate::properties::{Property, ANCHOR, BUBBLE_WHEEL, DOCK, LAYER_OPACITY, PADDING, SPECIFIED_BOUNDS};

new_key_type! {
    /// Unique identifier for an element in the tree
    pub struct NodeId;
}

/// Structural errors from tree mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("element {0:?} is not in the tree")]
    UnknownNode(NodeId),

    #[error("cannot add {child:?} under {parent:?}: it is the element itself or one of its ancestors")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Owner of every element and of the shared invalidation channel
#[derive(Debug, Default)]
pub struct ElementTree {
    nodes: SlotMap<NodeId, Element>,
    roots: Vec<NodeId>,
    invalidator: Invalidator,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree that reports paint invalidation to `invalidator`
    pub fn with_invalidator(invalidator: Invalidator) -> Self {
        Self {
            invalidator,
            ..Default::default()
        }
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Insert a parentless element
    pub fn insert(&mut self, element: Element) -> NodeId {
        let id = self.nodes.insert(element);
        self.roots.push(id);
        self.invalidator.invalidate(id);
        tracing::trace!(?id, name = self.nodes[id].name(), "inserted root element");
        id
    }

    /// Insert an element as the last child of `parent`
    pub fn insert_child(&mut self, parent: NodeId, element: Element) -> Result<NodeId, TreeError> {
        if !self.nodes.contains_key(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        let id = self.nodes.insert(element);
        self.attach(parent, id);
        Ok(id)
    }

    /// Move `child` (and its subtree) under `parent`
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(TreeError::UnknownNode(child));
        }
        if self.ancestors_inclusive(parent).any(|id| id == child) {
            return Err(TreeError::Cycle { parent, child });
        }

        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Remove `id` and its whole subtree, returning the removed ids
    ///
    /// Pending layout requests of removed elements are dropped with them.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::UnknownNode(id));
        }
        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.nodes.remove(next) {
                stack.extend(element.children.iter().copied());
                removed.push(next);
            }
        }

        tracing::debug!(?id, count = removed.len(), "removed element subtree");
        Ok(removed)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        if !self.is_arranging(parent) {
            self.capture_anchor_info(child);
        }
        self.invalidator.invalidate(child);
        self.request_layout(parent);
    }

    /// Unlink `id` from its parent (or the root list); returns the old parent
    fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id].parent.take() {
            Some(parent) => {
                if let Some(siblings) = self.nodes.get_mut(parent).map(|p| &mut p.children) {
                    siblings.retain(|c| *c != id);
                }
                self.invalidator.invalidate(parent);
                self.request_layout(parent);
                Some(parent)
            }
            None => {
                self.roots.retain(|r| *r != id);
                None
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id)
    }

    /// Access an element that must exist
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale; that is a bug in the caller.
    pub fn node(&self, id: NodeId) -> &Element {
        match self.nodes.get(id) {
            Some(element) => element,
            None => panic!("ElementTree::node: {id:?} is not in the tree"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Element {
        match self.nodes.get_mut(id) {
            Some(element) => element,
            None => panic!("ElementTree::node_mut: {id:?} is not in the tree"),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    /// Children in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Children ordered bottom-most first: ascending z, ties in insertion order
    pub fn children_by_z(&self, id: NodeId) -> SmallVec<[NodeId; 16]> {
        let mut children: SmallVec<[NodeId; 16]> = self.children(id).iter().copied().collect();
        children.sort_by_key(|c| self.nodes[*c].z_index);
        children
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), move |current| self.parent(*current))
    }

    /// Depth-first pre-order walk of the subtree at `id`, in child order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.nodes.get(next) {
                out.push(next);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Bounds relative to the parent's client origin
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.node(id).bounds
    }

    /// Bounds in window client coordinates
    pub fn absolute_bounds(&self, id: NodeId) -> Rect {
        let bounds = self.bounds(id);
        let origin = self
            .ancestors_inclusive(id)
            .skip(1)
            .fold(bounds.origin, |p, a| {
                let o = self.nodes[a].bounds.origin;
                Point::new(p.x + o.x, p.y + o.y)
            });
        bounds.with_origin(origin)
    }

    /// Set bounds from user code
    ///
    /// Outside of the parent's layout pass this also records the specified
    /// bounds, re-captures anchor offsets and re-runs the parent's dock fold.
    /// A size change lays out the element's own children.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        let parent = self.parent(id);
        let parent_arranging = parent.is_some_and(|p| self.is_arranging(p));

        if !parent_arranging {
            self.node_mut(id).properties.set(SPECIFIED_BOUNDS, bounds);
        }
        let size_changed = self.apply_bounds(id, bounds);

        if !parent_arranging {
            self.capture_anchor_info(id);
            if let Some(parent) = parent {
                if self.is_docked(id) {
                    self.request_layout(parent);
                }
            }
        }
        if size_changed {
            self.request_layout(id);
        }
    }

    pub fn set_location(&mut self, id: NodeId, location: Point) {
        let bounds = self.bounds(id).with_origin(location);
        self.set_bounds(id, bounds);
    }

    /// Apply bounds if they differ; returns whether the size changed
    pub(crate) fn apply_bounds(&mut self, id: NodeId, bounds: Rect) -> bool {
        let element = self.node_mut(id);
        if element.bounds == bounds {
            return false;
        }
        let old = std::mem::replace(&mut element.bounds, bounds);
        let parent = element.parent;

        self.invalidator.invalidate(id);
        if let Some(parent) = parent {
            self.invalidator.invalidate(parent);
        }
        old.size != bounds.size
    }

    // =========================================================================
    // Flags and properties
    // =========================================================================

    /// Show or hide an element; hidden elements stop painting, hit-testing
    /// and taking dock space immediately
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        let element = self.node_mut(id);
        if element.visible == visible {
            return;
        }
        element.visible = visible;
        let parent = element.parent;
        self.invalidator.invalidate(id);
        if let Some(parent) = parent {
            self.invalidator.invalidate(parent);
            self.request_layout(parent);
        }
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        let element = self.node_mut(id);
        if element.enabled != enabled {
            element.enabled = enabled;
            self.invalidator.invalidate(id);
        }
    }

    /// Whether the element and all of its ancestors are visible
    pub fn is_visible_in_tree(&self, id: NodeId) -> bool {
        self.contains(id) && self.ancestors_inclusive(id).all(|a| self.nodes[a].visible)
    }

    /// Whether the element may take keyboard focus
    pub fn can_focus(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|e| e.tab_stop)
            && self
                .ancestors_inclusive(id)
                .all(|a| self.nodes[a].visible && self.nodes[a].enabled)
    }

    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) {
        let element = self.node_mut(id);
        if element.z_index != z_index {
            element.z_index = z_index;
            let target = element.parent.unwrap_or(id);
            self.invalidator.invalidate(target);
        }
    }

    /// Raise above every sibling
    ///
    /// When no rank is left above the top sibling, the other siblings are
    /// re-ranked from zero in their current order first.
    pub fn bring_to_front(&mut self, id: NodeId) {
        let top = self
            .siblings(id)
            .filter(|s| *s != id)
            .map(|s| self.nodes[s].z_index)
            .max();
        let Some(top) = top else {
            return;
        };
        if self.node(id).z_index > top {
            return;
        }
        let z = match top.checked_add(1) {
            Some(z) => z,
            None => self.rerank_siblings(id, 0),
        };
        self.set_z_index(id, z);
    }

    /// Lower beneath every sibling
    ///
    /// Re-ranks the other siblings from one when no rank is left below.
    pub fn send_to_back(&mut self, id: NodeId) {
        let bottom = self
            .siblings(id)
            .filter(|s| *s != id)
            .map(|s| self.nodes[s].z_index)
            .min();
        let Some(bottom) = bottom else {
            return;
        };
        if self.node(id).z_index < bottom {
            return;
        }
        let z = match bottom.checked_sub(1) {
            Some(z) => z,
            None => {
                self.rerank_siblings(id, 1);
                0
            }
        };
        self.set_z_index(id, z);
    }

    /// Give the siblings of `id` consecutive ranks from `base`, keeping their
    /// paint order; returns the rank after the last one
    fn rerank_siblings(&mut self, id: NodeId, base: i32) -> i32 {
        let mut ordered: SmallVec<[NodeId; 16]> = self.siblings(id).filter(|s| *s != id).collect();
        ordered.sort_by_key(|s| self.nodes[*s].z_index);

        let mut rank = base;
        for sibling in ordered {
            self.nodes[sibling].z_index = rank;
            rank += 1;
        }
        let target = self.parent(id).unwrap_or(id);
        self.invalidator.invalidate(target);
        tracing::trace!(?id, "re-ranked siblings");
        rank
    }

    fn siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let list = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        list.iter().copied()
    }

    pub fn set_dock(&mut self, id: NodeId, dock: Dock) {
        let previous = self.node_mut(id).properties.set(DOCK, dock);
        if previous.unwrap_or_default() == dock {
            return;
        }
        if dock == Dock::None {
            self.capture_anchor_info(id);
        }
        self.request_parent_layout(id);
    }

    pub fn set_anchor(&mut self, id: NodeId, anchor: Anchor) {
        let previous = self.node_mut(id).properties.set(ANCHOR, anchor);
        if previous == Some(anchor) {
            return;
        }
        let parent_arranging = self.parent(id).is_some_and(|p| self.is_arranging(p));
        if !parent_arranging {
            self.capture_anchor_info(id);
        }
        self.request_parent_layout(id);
    }

    pub fn set_padding(&mut self, id: NodeId, padding: Padding) {
        let previous = self.node_mut(id).properties.set(PADDING, padding);
        if previous.unwrap_or_default() != padding {
            self.invalidator.invalidate(id);
            self.request_layout(id);
        }
    }

    /// Composite the subtree through its own layer, or `None` to draw inline
    pub fn set_layer_opacity(&mut self, id: NodeId, opacity: Option<f32>) {
        let properties = &mut self.node_mut(id).properties;
        match opacity {
            Some(opacity) => {
                properties.set(LAYER_OPACITY, opacity.clamp(0.0, 1.0));
            }
            None => {
                properties.remove(LAYER_OPACITY);
            }
        }
        self.invalidator.invalidate(id);
    }

    pub fn set_bubble_wheel(&mut self, id: NodeId, bubble: bool) {
        self.node_mut(id).properties.set(BUBBLE_WHEEL, bubble);
    }

    pub fn set_tab_stop(&mut self, id: NodeId, tab_stop: bool, tab_index: i32) {
        let element = self.node_mut(id);
        element.tab_stop = tab_stop;
        element.tab_index = tab_index;
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.node_mut(id).name = name.into();
    }

    /// Set an arbitrary property; treated as a visual change only
    pub fn set_property<T: 'static>(&mut self, id: NodeId, key: Property<T>, value: T) -> Option<T> {
        let previous = self.node_mut(id).properties.set(key, value);
        self.invalidator.invalidate(id);
        previous
    }

    pub fn property<T: 'static>(&self, id: NodeId, key: Property<T>) -> Option<&T> {
        self.get(id)?.properties.get(key)
    }

    fn request_parent_layout(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.request_layout(parent);
        }
    }

    pub fn layout_state(&self, id: NodeId) -> &LayoutState {
        &self.node(id).layout
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    pub fn set_painter(&mut self, id: NodeId, painter: Option<Rc<dyn Paintable>>) {
        self.node_mut(id).painter = painter;
        self.invalidator.invalidate(id);
    }

    pub fn set_layout_hook(&mut self, id: NodeId, hook: Option<Rc<dyn Layoutable>>) {
        self.node_mut(id).layout_hook = hook;
    }

    pub fn set_hit_shape(&mut self, id: NodeId, shape: Option<Rc<dyn HitTestable>>) {
        self.node_mut(id).hit_shape = shape;
    }

    pub fn handlers_mut(&mut self, id: NodeId) -> &mut EventHandlers {
        &mut self.node_mut(id).handlers
    }

    /// Run the handlers of `ctx.node_id` for `ctx.event_type`
    ///
    /// Handlers are cloned out first so they may be replaced while running.
    pub fn dispatch(&self, ctx: &EventContext) {
        let Some(element) = self.nodes.get(ctx.node_id) else {
            return;
        };
        for handler in element.handlers.get(ctx.event_type) {
            handler(ctx);
        }
    }

    // =========================================================================
    // Paint support
    // =========================================================================

    /// Request a repaint of `id`
    pub fn invalidate(&self, id: NodeId) {
        self.invalidator.invalidate(id);
    }

    /// Read-only view for paint callbacks
    pub fn view(&self, id: NodeId) -> Option<ElementView<'_>> {
        self.nodes
            .get(id)
            .map(|element| ElementView::new(id, element, &self.invalidator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ElementTree, NodeId, NodeId, NodeId) {
        let mut tree = ElementTree::new();
        let root = tree.insert(Element::new("root").with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let a = tree
            .insert_child(root, Element::new("a").with_bounds(Rect::new(10.0, 10.0, 50.0, 50.0)))
            .unwrap();
        let b = tree
            .insert_child(a, Element::new("b").with_bounds(Rect::new(5.0, 5.0, 10.0, 10.0)))
            .unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn test_absolute_bounds() {
        let (tree, _, _, b) = sample();
        assert_eq!(tree.absolute_bounds(b), Rect::new(15.0, 15.0, 10.0, 10.0));
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, root, a, b) = sample();
        assert_eq!(
            tree.add_child(b, a),
            Err(TreeError::Cycle { parent: b, child: a })
        );
        assert_eq!(
            tree.add_child(a, a),
            Err(TreeError::Cycle { parent: a, child: a })
        );
        assert_eq!(tree.children(root), &[a]);
    }

    #[test]
    fn test_reparent_moves_subtree() {
        let (mut tree, root, a, b) = sample();
        tree.add_child(root, b).unwrap();
        assert_eq!(tree.children(root), &[a, b]);
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.parent(b), Some(root));
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, root, a, b) = sample();
        let removed = tree.remove(a).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.remove(a), Err(TreeError::UnknownNode(a)));
    }

    #[test]
    fn test_removed_element_drops_pending_layout() {
        let (mut tree, _, a, _) = sample();
        tree.suspend_layout(a);
        tree.request_layout(a);
        tree.remove(a).unwrap();
        // Nothing left to replay
        tree.resume_layout(a, true);
        assert!(!tree.contains(a));
    }

    #[test]
    #[should_panic(expected = "is not in the tree")]
    fn test_stale_id_panics() {
        let (mut tree, _, a, _) = sample();
        tree.remove(a).unwrap();
        let _ = tree.node(a);
    }

    #[test]
    fn test_z_order() {
        let (mut tree, root, a, _) = sample();
        let c = tree.insert_child(root, Element::new("c")).unwrap();
        let d = tree.insert_child(root, Element::new("d")).unwrap();
        assert_eq!(tree.children_by_z(root).as_slice(), &[a, c, d]);

        tree.bring_to_front(a);
        assert_eq!(tree.children_by_z(root).as_slice(), &[c, d, a]);

        tree.send_to_back(d);
        assert_eq!(tree.children_by_z(root).as_slice(), &[d, c, a]);
        // Insertion order is untouched
        assert_eq!(tree.children(root), &[a, c, d]);
    }

    #[test]
    fn test_z_order_at_rank_limits() {
        let (mut tree, root, a, _) = sample();
        let c = tree.insert_child(root, Element::new("c")).unwrap();
        let d = tree.insert_child(root, Element::new("d")).unwrap();

        tree.set_z_index(a, i32::MAX);
        tree.bring_to_front(c);
        assert_eq!(tree.children_by_z(root).as_slice(), &[d, a, c]);
        assert!(tree.node(c).z_index() > tree.node(a).z_index());

        tree.set_z_index(d, i32::MIN);
        tree.send_to_back(a);
        assert_eq!(tree.children_by_z(root).as_slice(), &[a, d, c]);
    }

    #[test]
    fn test_remove_lays_out_parent_once() {
        let (mut tree, root, a, _) = sample();
        let passes = tree.layout_state(root).passes();
        tree.remove(a).unwrap();
        assert_eq!(tree.layout_state(root).passes(), passes + 1);
    }

    #[test]
    fn test_mutations_invalidate() {
        let (mut tree, root, a, _) = sample();
        tree.invalidator().clear();
        tree.set_visible(a, false);
        assert!(tree.invalidator().is_dirty(a));
        assert!(tree.invalidator().is_dirty(root));
        assert!(!tree.is_visible_in_tree(a));
    }

    #[test]
    fn test_can_focus_requires_enabled_ancestors() {
        let (mut tree, _, a, b) = sample();
        tree.set_tab_stop(b, true, 0);
        assert!(tree.can_focus(b));
        tree.set_enabled(a, false);
        assert!(!tree.can_focus(b));
    }

    #[test]
    fn test_descendants_pre_order() {
        let (mut tree, root, a, b) = sample();
        let c = tree.insert_child(root, Element::new("c")).unwrap();
        assert_eq!(tree.descendants(root), vec![root, a, b, c]);
    }
}
