//! Dock and anchor layout
//!
//! A container lays out its visible children in child order against its
//! display rectangle (client area minus padding):
//!
//! - Docked children are a sequential fold over the *remaining* rectangle.
//!   `Top`/`Bottom` take their specified height, `Left`/`Right` their
//!   specified width, each clamped to what is left. `Fill` children are
//!   placed after every other dock and the first one takes the remainder.
//! - Anchored children keep the distance to each anchored edge that was
//!   captured the last time their anchor, bounds or parent changed outside
//!   of layout. Anchoring both opposing edges stretches; anchoring neither
//!   keeps the element centred on that axis.
//! - Children with an empty anchor and no dock are positioned manually and
//!   never touched.
//!
//! Layout is synchronous. A request made while the container is suspended
//! is remembered and replayed once on resume; a request made while the
//! container is already arranging is dropped.

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;
use smallvec::SmallVec;
use veneer_core::{Rect, Size};

use crate::properties::{ANCHOR, ANCHOR_INFO, DOCK, PADDING, SPECIFIED_BOUNDS};
use crate::tree::{ElementTree, NodeId};

/// Edge of the remaining rectangle a child docks to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dock {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
    Fill,
}

bitflags! {
    /// Container edges an element keeps a fixed distance from
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Anchor: u8 {
        /// Manual positioning
        const NONE = 0;
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::TOP | Anchor::LEFT
    }
}

/// Captured edge offsets of an anchored element
///
/// `left`/`top`/`right`/`bottom` are measured from the display origin.
/// A trailing edge that is anchored is stored relative to the container's
/// trailing edge instead; an axis with neither edge anchored is stored
/// relative to the container's centre.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnchorInfo {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// How layout treats an element, derived from its dock and anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Docked(Dock),
    Anchored(Anchor),
    Manual,
}

impl LayoutMode {
    pub fn resolve(dock: Dock, anchor: Anchor) -> Self {
        if dock != Dock::None {
            LayoutMode::Docked(dock)
        } else if anchor.is_empty() {
            LayoutMode::Manual
        } else {
            LayoutMode::Anchored(anchor)
        }
    }
}

/// Record an element's edge offsets relative to `display`
pub fn capture_anchor(anchor: Anchor, bounds: Rect, display: Rect) -> AnchorInfo {
    let mut info = AnchorInfo {
        left: bounds.left() - display.x(),
        top: bounds.top() - display.y(),
        right: bounds.right() - display.x(),
        bottom: bounds.bottom() - display.y(),
    };

    let width = display.width();
    if anchor.contains(Anchor::RIGHT) {
        info.right -= width;
        if !anchor.contains(Anchor::LEFT) {
            info.left -= width;
        }
    } else if !anchor.contains(Anchor::LEFT) {
        info.right -= width / 2.0;
        info.left -= width / 2.0;
    }

    let height = display.height();
    if anchor.contains(Anchor::BOTTOM) {
        info.bottom -= height;
        if !anchor.contains(Anchor::TOP) {
            info.top -= height;
        }
    } else if !anchor.contains(Anchor::TOP) {
        info.bottom -= height / 2.0;
        info.top -= height / 2.0;
    }

    info
}

/// Bounds an anchored element should take inside `display`
pub fn anchor_destination(anchor: Anchor, info: &AnchorInfo, display: Rect) -> Rect {
    let mut left = info.left + display.x();
    let mut top = info.top + display.y();
    let mut right = info.right + display.x();
    let mut bottom = info.bottom + display.y();

    let width = display.width();
    if anchor.contains(Anchor::RIGHT) {
        right += width;
        if !anchor.contains(Anchor::LEFT) {
            left += width;
        }
    } else if !anchor.contains(Anchor::LEFT) {
        right += width / 2.0;
        left += width / 2.0;
    }

    let height = display.height();
    if anchor.contains(Anchor::BOTTOM) {
        bottom += height;
        if !anchor.contains(Anchor::TOP) {
            top += height;
        }
    } else if !anchor.contains(Anchor::TOP) {
        bottom += height / 2.0;
        top += height / 2.0;
    }

    Rect::from_edges(left, top, right.max(left), bottom.max(top))
}

/// Remaining-rectangle cursor for sequential docking
#[derive(Clone, Copy, Debug)]
pub struct DockFold {
    remaining: Rect,
    fill_taken: bool,
}

impl DockFold {
    pub fn new(display: Rect) -> Self {
        let size = display.size.clamp_non_negative();
        Self {
            remaining: display.with_size(size),
            fill_taken: false,
        }
    }

    pub fn remaining(&self) -> Rect {
        self.remaining
    }

    /// Carve a non-fill dock of the given specified size off the remainder
    pub fn place(&mut self, dock: Dock, specified: Size) -> Rect {
        let r = self.remaining;
        match dock {
            Dock::Top => {
                let h = specified.height.clamp(0.0, r.height());
                self.remaining = Rect::new(r.x(), r.y() + h, r.width(), r.height() - h);
                Rect::new(r.x(), r.y(), r.width(), h)
            }
            Dock::Bottom => {
                let h = specified.height.clamp(0.0, r.height());
                self.remaining = Rect::new(r.x(), r.y(), r.width(), r.height() - h);
                Rect::new(r.x(), r.bottom() - h, r.width(), h)
            }
            Dock::Left => {
                let w = specified.width.clamp(0.0, r.width());
                self.remaining = Rect::new(r.x() + w, r.y(), r.width() - w, r.height());
                Rect::new(r.x(), r.y(), w, r.height())
            }
            Dock::Right => {
                let w = specified.width.clamp(0.0, r.width());
                self.remaining = Rect::new(r.x(), r.y(), r.width() - w, r.height());
                Rect::new(r.right() - w, r.y(), w, r.height())
            }
            Dock::Fill => self.take_fill(),
            Dock::None => Rect::new(r.x(), r.y(), 0.0, 0.0),
        }
    }

    /// The first call takes the whole remainder; later calls get zero area
    pub fn take_fill(&mut self) -> Rect {
        let r = self.remaining;
        if self.fill_taken {
            return Rect::new(r.x(), r.y(), 0.0, 0.0);
        }
        self.fill_taken = true;
        r
    }
}

/// Scoped "is arranging" token for one container
///
/// Holding the guard marks the container as arranging; dropping it clears
/// the mark on every exit path, including unwinding.
#[derive(Debug)]
pub struct ArrangeGuard {
    flag: Rc<Cell<bool>>,
}

impl ArrangeGuard {
    /// Acquire the guard, or `None` if the container is already arranging
    pub fn try_acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self {
            flag: Rc::clone(flag),
        })
    }
}

impl Drop for ArrangeGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Per-element layout bookkeeping
#[derive(Debug, Default)]
pub struct LayoutState {
    pub(crate) suspend_count: u32,
    pub(crate) pending: bool,
    pub(crate) arranging: Rc<Cell<bool>>,
    pub(crate) passes: u64,
}

impl LayoutState {
    pub fn is_suspended(&self) -> bool {
        self.suspend_count > 0
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_arranging(&self) -> bool {
        self.arranging.get()
    }

    /// Number of layout passes this element has run as a container
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

// ============================================================================
// Layout engine
// ============================================================================

impl ElementTree {
    /// Client rect minus padding, in the element's own coordinates
    pub fn display_rect(&self, id: NodeId) -> Rect {
        let element = self.node(id);
        let padding = element.properties.get_or_default(PADDING);
        element.bounds.size.to_rect().inset(padding)
    }

    /// Defer layout of `id` until the matching [`resume_layout`](Self::resume_layout)
    pub fn suspend_layout(&mut self, id: NodeId) {
        if let Some(element) = self.get_mut(id) {
            element.layout.suspend_count += 1;
        }
    }

    /// Undo one [`suspend_layout`](Self::suspend_layout)
    ///
    /// When the count reaches zero and `perform` is set, requests recorded
    /// while suspended run as a single pass.
    pub fn resume_layout(&mut self, id: NodeId, perform: bool) {
        let Some(element) = self.get_mut(id) else {
            return;
        };
        let state = &mut element.layout;
        if state.suspend_count == 0 {
            tracing::warn!(?id, "resume_layout without a matching suspend_layout");
            return;
        }
        state.suspend_count -= 1;
        if state.suspend_count == 0 && perform && state.pending {
            self.request_layout(id);
        }
    }

    /// Ask `id` to lay out its children
    ///
    /// Recorded while suspended, dropped while arranging, otherwise run now.
    pub fn request_layout(&mut self, id: NodeId) {
        let Some(element) = self.get_mut(id) else {
            return;
        };
        if element.layout.suspend_count > 0 {
            element.layout.pending = true;
            tracing::trace!(?id, "layout deferred while suspended");
            return;
        }
        if element.layout.arranging.get() {
            tracing::trace!(?id, "re-entrant layout request ignored");
            return;
        }
        self.run_layout_pass(id);
    }

    pub fn is_arranging(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.layout.arranging.get())
    }

    fn run_layout_pass(&mut self, id: NodeId) {
        let element = self.node_mut(id);
        let Some(_guard) = ArrangeGuard::try_acquire(&element.layout.arranging) else {
            return;
        };
        element.layout.pending = false;
        element.layout.passes += 1;
        let hook = element.layout_hook.clone();

        let display_rect = self.display_rect(id);
        tracing::trace!(?id, ?display_rect, "layout pass");

        let resized = self.resolve_layout(id, display_rect);

        if let Some(hook) = hook {
            hook.on_layout(self, id, display_rect);
        }

        for child in resized {
            self.request_layout(child);
        }
    }

    /// Resolve dock and anchor bounds for the visible children of `container`
    ///
    /// Returns the children whose size changed.
    pub(crate) fn resolve_layout(
        &mut self,
        container: NodeId,
        display: Rect,
    ) -> SmallVec<[NodeId; 8]> {
        let children: SmallVec<[NodeId; 16]> = self.node(container).children.iter().copied().collect();
        let mut fold = DockFold::new(display);
        let mut fills: SmallVec<[NodeId; 2]> = SmallVec::new();
        let mut resized = SmallVec::new();

        for child in children {
            let element = self.node(child);
            if !element.visible {
                continue;
            }

            let target = match element.layout_mode() {
                LayoutMode::Manual => continue,
                LayoutMode::Docked(Dock::Fill) => {
                    fills.push(child);
                    continue;
                }
                LayoutMode::Docked(dock) => {
                    let specified = element
                        .properties
                        .get(SPECIFIED_BOUNDS)
                        .copied()
                        .unwrap_or(element.bounds);
                    fold.place(dock, specified.size)
                }
                LayoutMode::Anchored(anchor) => {
                    let info = match element.properties.get(ANCHOR_INFO).copied() {
                        Some(info) => info,
                        None => {
                            let info = capture_anchor(anchor, element.bounds, display);
                            self.node_mut(child).properties.set(ANCHOR_INFO, info);
                            info
                        }
                    };
                    anchor_destination(anchor, &info, display)
                }
            };

            if self.apply_bounds(child, target) {
                resized.push(child);
            }
        }

        for child in fills {
            let target = fold.take_fill();
            if self.apply_bounds(child, target) {
                resized.push(child);
            }
        }

        resized
    }

    /// Re-record the anchor offsets of `id` against its parent's display rect
    pub(crate) fn capture_anchor_info(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let display = self.display_rect(parent);
        let element = self.node_mut(id);
        let anchor = element.properties.get_or_default(ANCHOR);
        let info = capture_anchor(anchor, element.bounds, display);
        element.properties.set(ANCHOR_INFO, info);
    }

    /// Whether `id` takes part in its parent's dock fold
    pub(crate) fn is_docked(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|e| e.properties.get_or_default(DOCK) != Dock::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use veneer_core::Padding;

    fn container(width: f32, height: f32) -> (ElementTree, NodeId) {
        let mut tree = ElementTree::new();
        let root = tree.insert(Element::new("root").with_bounds(Rect::new(0.0, 0.0, width, height)));
        (tree, root)
    }

    fn docked(tree: &mut ElementTree, parent: NodeId, dock: Dock, bounds: Rect) -> NodeId {
        tree.insert_child(parent, Element::new("docked").with_bounds(bounds).with_dock(dock))
            .unwrap()
    }

    fn anchored(tree: &mut ElementTree, parent: NodeId, anchor: Anchor, bounds: Rect) -> NodeId {
        tree.insert_child(parent, Element::new("anchored").with_bounds(bounds).with_anchor(anchor))
            .unwrap()
    }

    #[test]
    fn test_top_bottom_fill() {
        let (mut tree, root) = container(100.0, 100.0);
        let top = docked(&mut tree, root, Dock::Top, Rect::new(0.0, 0.0, 10.0, 20.0));
        let bottom = docked(&mut tree, root, Dock::Bottom, Rect::new(0.0, 0.0, 10.0, 15.0));
        let fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.request_layout(root);

        assert_eq!(tree.bounds(top), Rect::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(tree.bounds(bottom), Rect::new(0.0, 85.0, 100.0, 15.0));
        assert_eq!(tree.bounds(fill), Rect::new(0.0, 20.0, 100.0, 65.0));
    }

    #[test]
    fn test_fill_before_docks_still_gets_remainder() {
        let (mut tree, root) = container(100.0, 100.0);
        let fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        let left = docked(&mut tree, root, Dock::Left, Rect::new(0.0, 0.0, 30.0, 0.0));
        let second_fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.request_layout(root);

        assert_eq!(tree.bounds(left), Rect::new(0.0, 0.0, 30.0, 100.0));
        assert_eq!(tree.bounds(fill), Rect::new(30.0, 0.0, 70.0, 100.0));
        assert_eq!(tree.bounds(second_fill).size, Size::ZERO);
    }

    #[test]
    fn test_dock_extents_never_exceed_container() {
        let docks = [Dock::Top, Dock::Left, Dock::Bottom, Dock::Right];
        for count in 1..12 {
            let (mut tree, root) = container(120.0, 80.0);
            let mut ids = Vec::new();
            for i in 0..count {
                let extent = 7.0 + (i * 13 % 40) as f32;
                ids.push(docked(
                    &mut tree,
                    root,
                    docks[i % docks.len()],
                    Rect::new(0.0, 0.0, extent, extent),
                ));
            }
            tree.request_layout(root);

            let mut vertical = 0.0;
            let mut horizontal = 0.0;
            for (i, id) in ids.iter().enumerate() {
                let b = tree.bounds(*id);
                assert!(b.width() >= 0.0 && b.height() >= 0.0);
                match docks[i % docks.len()] {
                    Dock::Top | Dock::Bottom => vertical += b.height(),
                    _ => horizontal += b.width(),
                }
            }
            assert!(vertical <= 80.0, "vertical {vertical} with {count} docks");
            assert!(horizontal <= 120.0, "horizontal {horizontal} with {count} docks");
        }
    }

    #[test]
    fn test_degenerate_container_clamps() {
        let (mut tree, root) = container(0.0, 0.0);
        let top = docked(&mut tree, root, Dock::Top, Rect::new(0.0, 0.0, 10.0, 20.0));
        let fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.request_layout(root);
        assert_eq!(tree.bounds(top).size, Size::ZERO);
        assert_eq!(tree.bounds(fill).size, Size::ZERO);
    }

    #[test]
    fn test_padding_shrinks_display() {
        let mut tree = ElementTree::new();
        let root = tree.insert(
            Element::new("root")
                .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0))
                .with_padding(Padding::uniform(5.0)),
        );
        let fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.request_layout(root);
        assert_eq!(tree.bounds(fill), Rect::new(5.0, 5.0, 90.0, 90.0));
    }

    #[test]
    fn test_left_top_anchor_unchanged_on_resize() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::LEFT | Anchor::TOP, Rect::new(10.0, 10.0, 50.0, 50.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(tree.bounds(child), Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_left_right_anchor_stretches() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::LEFT | Anchor::RIGHT, Rect::new(10.0, 10.0, 180.0, 50.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(tree.bounds(child), Rect::new(10.0, 10.0, 280.0, 50.0));
    }

    #[test]
    fn test_trailing_anchor_shifts() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::RIGHT | Anchor::BOTTOM, Rect::new(150.0, 160.0, 40.0, 30.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 300.0, 250.0));
        assert_eq!(tree.bounds(child), Rect::new(250.0, 210.0, 40.0, 30.0));
    }

    #[test]
    fn test_unanchored_axis_keeps_centre() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::TOP, Rect::new(80.0, 10.0, 40.0, 20.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(tree.bounds(child), Rect::new(130.0, 10.0, 40.0, 20.0));
    }

    #[test]
    fn test_shrinking_below_anchored_width_clamps() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::LEFT | Anchor::RIGHT, Rect::new(10.0, 10.0, 180.0, 50.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 5.0, 200.0));
        assert_eq!(tree.bounds(child).width(), 0.0);
    }

    #[test]
    fn test_resize_matches_fresh_layout_and_is_idempotent() {
        let anchors = [
            Anchor::LEFT | Anchor::TOP,
            Anchor::LEFT | Anchor::RIGHT,
            Anchor::RIGHT | Anchor::BOTTOM,
            Anchor::all(),
            Anchor::TOP,
            Anchor::BOTTOM | Anchor::LEFT,
        ];
        let start = Rect::new(10.0, 20.0, 60.0, 40.0);

        for anchor in anchors {
            // Placed at 200x150, resized to 260x190
            let (mut resized, root) = container(200.0, 150.0);
            let child = anchored(&mut resized, root, anchor, start);
            resized.set_bounds(root, Rect::new(0.0, 0.0, 260.0, 190.0));
            let after_resize = resized.bounds(child);

            // Capture the resized result fresh and lay out again
            let (mut fresh, fresh_root) = container(260.0, 190.0);
            let fresh_child = anchored(&mut fresh, fresh_root, anchor, after_resize);
            fresh.request_layout(fresh_root);
            assert_eq!(fresh.bounds(fresh_child), after_resize, "{anchor:?}");

            resized.request_layout(root);
            resized.request_layout(root);
            assert_eq!(resized.bounds(child), after_resize, "{anchor:?} not idempotent");
        }
    }

    #[test]
    fn test_manual_children_untouched() {
        let (mut tree, root) = container(200.0, 200.0);
        let child = anchored(&mut tree, root, Anchor::NONE, Rect::new(1.0, 2.0, 3.0, 4.0));
        tree.set_bounds(root, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(tree.bounds(child), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_hidden_children_do_not_dock() {
        let (mut tree, root) = container(100.0, 100.0);
        let top = docked(&mut tree, root, Dock::Top, Rect::new(0.0, 0.0, 0.0, 30.0));
        let fill = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.set_visible(top, false);
        assert_eq!(tree.bounds(fill), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_suspend_coalesces_into_one_pass() {
        let (mut tree, root) = container(100.0, 100.0);
        let before = tree.layout_state(root).passes();

        tree.suspend_layout(root);
        let top = docked(&mut tree, root, Dock::Top, Rect::new(0.0, 0.0, 0.0, 10.0));
        docked(&mut tree, root, Dock::Bottom, Rect::new(0.0, 0.0, 0.0, 10.0));
        docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        tree.set_dock(top, Dock::Left);
        assert_eq!(tree.layout_state(root).passes(), before);
        assert!(tree.layout_state(root).is_pending());

        tree.resume_layout(root, true);
        assert_eq!(tree.layout_state(root).passes(), before + 1);
        assert!(!tree.layout_state(root).is_pending());
    }

    #[test]
    fn test_nested_suspend_needs_matching_resumes() {
        let (mut tree, root) = container(100.0, 100.0);
        tree.suspend_layout(root);
        tree.suspend_layout(root);
        tree.request_layout(root);
        let before = tree.layout_state(root).passes();

        tree.resume_layout(root, true);
        assert_eq!(tree.layout_state(root).passes(), before);
        tree.resume_layout(root, true);
        assert_eq!(tree.layout_state(root).passes(), before + 1);
    }

    #[test]
    fn test_reentrant_layout_is_suppressed() {
        use std::cell::Cell;

        let (mut tree, root) = container(100.0, 100.0);
        let hook_runs = Rc::new(Cell::new(0));
        let runs = Rc::clone(&hook_runs);
        tree.set_layout_hook(
            root,
            Some(Rc::new(move |tree: &mut ElementTree, id: NodeId, _display: Rect| {
                runs.set(runs.get() + 1);
                assert!(tree.is_arranging(id));
                // Would recurse forever without the guard
                tree.request_layout(id);
            })),
        );

        let passes = tree.layout_state(root).passes();
        tree.request_layout(root);
        assert_eq!(hook_runs.get(), 1);
        assert_eq!(tree.layout_state(root).passes(), passes + 1);
        assert!(!tree.is_arranging(root));
    }

    #[test]
    fn test_layout_hook_places_children_and_invalidates() {
        let (mut tree, root) = container(100.0, 100.0);
        let child = anchored(&mut tree, root, Anchor::NONE, Rect::ZERO);
        tree.set_layout_hook(
            root,
            Some(Rc::new(|tree: &mut ElementTree, id: NodeId, display: Rect| {
                let first = tree.children(id)[0];
                tree.set_bounds(first, Rect::new(0.0, 0.0, display.width() / 2.0, display.height()));
            })),
        );
        tree.invalidator().clear();
        tree.request_layout(root);

        assert_eq!(tree.bounds(child), Rect::new(0.0, 0.0, 50.0, 100.0));
        assert!(tree.invalidator().is_dirty(child));
    }

    #[test]
    fn test_resized_children_lay_out_their_own_children() {
        let (mut tree, root) = container(100.0, 100.0);
        let panel = docked(&mut tree, root, Dock::Fill, Rect::ZERO);
        let inner = docked(&mut tree, panel, Dock::Fill, Rect::ZERO);
        tree.set_bounds(root, Rect::new(0.0, 0.0, 80.0, 60.0));
        assert_eq!(tree.bounds(inner), Rect::new(0.0, 0.0, 80.0, 60.0));
    }

    #[test]
    fn test_guard_released_on_drop() {
        let flag = Rc::new(Cell::new(false));
        {
            let _guard = ArrangeGuard::try_acquire(&flag).unwrap();
            assert!(flag.get());
            assert!(ArrangeGuard::try_acquire(&flag).is_none());
        }
        assert!(!flag.get());
    }
}
