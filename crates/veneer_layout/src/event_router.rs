//! Event routing from platform input to elements
//!
//! ```text
//! Platform InputEvent (mouse moved, button pressed, key, wheel)
//!     ↓
//! EventRouter (capture, hit testing, hover and press tracking, focus)
//!     ↓
//! EventContext dispatched to the target element's handlers
//! ```
//!
//! Pointer input goes to the capture target if there is one, otherwise to
//! the deepest element under the pointer. Keyboard input goes to the
//! focused element. Every entry point returns the `(element, event)` pairs
//! it dispatched, in order.
//!
//! Handlers change capture and focus through their [`EventContext`]; the
//! router applies those requests right after the handler returns, and the
//! resulting `CaptureLost`/focus events land in the same dispatch list.
//! Tree edits handlers defer wait in [`EventRouter::deferred`] until the
//! owner of the tree calls [`EventRouter::apply_deferred`].
//!
//! ```
//! use veneer_layout::prelude::*;
//! use veneer_core::Rect;
//! use veneer_platform::MouseButton;
//!
//! let mut tree = ElementTree::new();
//! let root = tree.insert(Element::new("window").with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0)));
//! let button = tree
//!     .insert_child(root, Element::new("ok").with_bounds(Rect::new(10.0, 10.0, 50.0, 20.0)))
//!     .unwrap();
//!
//! let mut router = EventRouter::new();
//! router.on_mouse_down(&tree, root, 20.0, 15.0, MouseButton::Left);
//! let events = router.on_mouse_up(&tree, root, 22.0, 16.0, MouseButton::Left);
//! assert!(events.contains(&(button, EventType::Click)));
//! ```

use smallvec::SmallVec;
use veneer_core::{Point, Rect};
use veneer_platform::{InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent};

use crate::event_handler::{DeferredEdits, EventContext, EventType, RequestQueue, RouterRequest};
use crate::focus::FocusContext;
use crate::tree::{ElementTree, NodeId};

/// Result of a hit test
#[derive(Clone, Debug, PartialEq)]
pub struct HitTestResult {
    /// The deepest element under the point
    pub node: NodeId,
    /// Position relative to the node's origin
    pub local_x: f32,
    pub local_y: f32,
    /// Chain from the root down to and including the hit node
    pub ancestors: SmallVec<[NodeId; 8]>,
}

/// Find the deepest, top-most element under `point`
///
/// Only visible, enabled elements take part; a hidden or disabled element
/// hides its whole subtree. Each element is clipped to its ancestors, and
/// siblings are tried from the highest z down (later insertion wins ties).
pub fn hit_test(tree: &ElementTree, root: NodeId, point: Point) -> Option<HitTestResult> {
    let clip = tree.get(root)?.bounds();
    let mut chain = SmallVec::new();
    hit_test_node(tree, root, Point::ZERO, clip, point, &mut chain)
}

fn hit_test_node(
    tree: &ElementTree,
    id: NodeId,
    origin: Point,
    clip: Rect,
    point: Point,
    chain: &mut SmallVec<[NodeId; 8]>,
) -> Option<HitTestResult> {
    let element = tree.get(id)?;
    if !element.is_visible() || !element.is_enabled() {
        return None;
    }

    let absolute = element.bounds().offset(origin.x, origin.y);
    let clipped = absolute.intersect(&clip);
    if !clipped.contains(point) {
        return None;
    }

    let local = Point::new(point.x - absolute.x(), point.y - absolute.y());
    if !element.accepts_point(local) {
        return None;
    }

    chain.push(id);
    for child in tree.children_by_z(id).iter().rev() {
        if let Some(hit) = hit_test_node(tree, *child, absolute.origin, clipped, point, chain) {
            return Some(hit);
        }
    }

    Some(HitTestResult {
        node: id,
        local_x: local.x,
        local_y: local.y,
        ancestors: chain.clone(),
    })
}

/// Events dispatched by one router call
pub type Dispatched = Vec<(NodeId, EventType)>;

/// Routes platform input to elements
///
/// Maintains state for:
/// - Current mouse position
/// - The element under the pointer (for enter/leave)
/// - The element a button was pressed on (release and click targeting)
/// - Pointer capture
/// - Keyboard focus, through its [`FocusContext`]
#[derive(Debug)]
pub struct EventRouter {
    mouse: Point,
    hovered: Option<NodeId>,
    pressed: Option<NodeId>,
    capture: Option<NodeId>,
    focus: FocusContext,
    requests: RequestQueue,
    edits: DeferredEdits,
}

impl Default for EventRouter {
    fn default() -> Self {
        let requests = RequestQueue::new();
        let edits = DeferredEdits::new();
        Self {
            mouse: Point::ZERO,
            hovered: None,
            pressed: None,
            capture: None,
            focus: FocusContext::with_queues(requests.clone(), edits.clone()),
            requests,
            edits,
        }
    }
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_position(&self) -> Point {
        self.mouse
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn pressed(&self) -> Option<NodeId> {
        self.pressed
    }

    pub fn focus(&self) -> &FocusContext {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusContext {
        &mut self.focus
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Tree edits queued by handlers and not yet applied
    pub fn deferred(&self) -> &DeferredEdits {
        &self.edits
    }

    pub fn apply_deferred(&mut self, tree: &mut ElementTree) -> usize {
        self.edits.apply(tree)
    }

    // =========================================================================
    // Capture
    // =========================================================================

    pub fn capture(&self) -> Option<NodeId> {
        self.capture
    }

    /// Send all pointer input to `id` until released
    ///
    /// An element losing capture to another receives `CaptureLost`.
    pub fn set_capture(&mut self, tree: &ElementTree, id: NodeId) -> Dispatched {
        let mut out = Dispatched::new();
        if !tree.contains(id) || self.capture == Some(id) {
            return out;
        }
        if let Some(old) = self.capture.replace(id) {
            let ctx = self.context(EventType::CaptureLost, old);
            self.emit(tree, ctx, &mut out);
        }
        tracing::trace!(?id, "pointer captured");
        out
    }

    pub fn release_capture(&mut self, tree: &ElementTree) -> Dispatched {
        let mut out = Dispatched::new();
        if let Some(old) = self.capture.take() {
            let ctx = self.context(EventType::CaptureLost, old);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    // =========================================================================
    // Mouse Events
    // =========================================================================

    /// Handle mouse move
    ///
    /// Emits `PointerLeave`/`PointerEnter` when the element under the
    /// pointer changes, then `PointerMove` to the target.
    pub fn on_mouse_move(&mut self, tree: &ElementTree, root: NodeId, x: f32, y: f32) -> Dispatched {
        self.mouse = Point::new(x, y);
        let mut out = Dispatched::new();

        if let Some(captured) = self.live_capture(tree) {
            let ctx = self.pointer_context(tree, EventType::PointerMove, captured);
            self.emit(tree, ctx, &mut out);
            return out;
        }

        let target = hit_test(tree, root, self.mouse).map(|hit| hit.node);
        self.update_hover(tree, target, &mut out);
        if let Some(target) = target {
            let ctx = self.pointer_context(tree, EventType::PointerMove, target);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    /// Handle button press
    ///
    /// Focuses the nearest focusable element in the hit chain; pressing on
    /// something with no focusable ancestor leaves focus where it was.
    pub fn on_mouse_down(
        &mut self,
        tree: &ElementTree,
        root: NodeId,
        x: f32,
        y: f32,
        button: MouseButton,
    ) -> Dispatched {
        self.mouse = Point::new(x, y);
        let mut out = Dispatched::new();

        let target = match self.live_capture(tree) {
            Some(captured) => Some(captured),
            None => {
                let hit = hit_test(tree, root, self.mouse);
                if let Some(hit) = &hit {
                    let focusable = hit.ancestors.iter().rev().find(|id| tree.can_focus(**id));
                    if let Some(id) = focusable {
                        self.focus_into(tree, *id, &mut out);
                    }
                }
                hit.map(|hit| hit.node)
            }
        };

        self.pressed = target;
        if let Some(target) = target {
            let ctx = self
                .pointer_context(tree, EventType::PointerDown, target)
                .with_button(button);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    /// Handle button release
    ///
    /// `PointerUp` goes to the element the press started on (or the capture
    /// target). `Click` follows when the release lands on that same element;
    /// while capture is held the release counts as landing on the capture
    /// target wherever the pointer is.
    pub fn on_mouse_up(
        &mut self,
        tree: &ElementTree,
        root: NodeId,
        x: f32,
        y: f32,
        button: MouseButton,
    ) -> Dispatched {
        self.mouse = Point::new(x, y);
        let mut out = Dispatched::new();

        let pressed = self.pressed.take().filter(|id| tree.contains(*id));
        let captured = self.live_capture(tree);
        let Some(target) = captured.or(pressed) else {
            return out;
        };
        // Read before PointerUp runs, which may release capture
        let released_on = captured.or_else(|| hit_test(tree, root, self.mouse).map(|hit| hit.node));

        let ctx = self
            .pointer_context(tree, EventType::PointerUp, target)
            .with_button(button);
        self.emit(tree, ctx, &mut out);

        if let Some(clicked) = pressed.filter(|id| released_on == Some(*id) && tree.contains(*id)) {
            let ctx = self
                .pointer_context(tree, EventType::Click, clicked)
                .with_button(button);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    /// Handle the pointer leaving the window
    pub fn on_mouse_leave(&mut self, tree: &ElementTree) -> Dispatched {
        let mut out = Dispatched::new();
        self.update_hover(tree, None, &mut out);
        out
    }

    /// Handle a wheel event at the current pointer position
    ///
    /// Delivered to the element under the pointer and passed up to the
    /// parent only while the current element leaves it unhandled and has
    /// opted into bubbling.
    pub fn on_wheel(&mut self, tree: &ElementTree, root: NodeId, delta_x: f32, delta_y: f32) -> Dispatched {
        let mut out = Dispatched::new();
        let target = self
            .live_capture(tree)
            .or_else(|| hit_test(tree, root, self.mouse).map(|hit| hit.node));
        let Some(mut current) = target else {
            return out;
        };

        let mut ctx = self
            .pointer_context(tree, EventType::Wheel, current)
            .with_scroll_delta(delta_x, delta_y);
        loop {
            self.dispatch(tree, &ctx, &mut out);

            if ctx.is_handled() || !tree.node(current).bubbles_wheel() {
                break;
            }
            let Some(parent) = tree.parent(current) else {
                break;
            };
            current = parent;
            let origin = tree.absolute_bounds(current).origin;
            ctx = ctx.retarget(current, self.mouse.x - origin.x, self.mouse.y - origin.y);
        }
        out
    }

    // =========================================================================
    // Keyboard Events
    // =========================================================================

    /// Handle key press
    ///
    /// Emits `KeyDown` to the focused element. An unhandled `Tab` moves
    /// focus forward, `Shift+Tab` backward.
    pub fn on_key_down(&mut self, tree: &ElementTree, root: NodeId, key: Key, modifiers: Modifiers) -> Dispatched {
        let mut out = Dispatched::new();
        let mut handled = false;

        if let Some(focused) = self.focus.focused() {
            let ctx = self
                .context(EventType::KeyDown, focused)
                .with_key(key.clone(), modifiers);
            self.dispatch(tree, &ctx, &mut out);
            handled = ctx.is_handled();
        }

        if !handled && key == Key::Tab && (modifiers.is_empty() || modifiers.shift_only()) {
            let previous = self.focus.focused();
            let next = self.focus.move_focus(tree, root, modifiers.shift);
            if next != previous {
                if let Some(old) = previous {
                    out.push((old, EventType::LostFocus));
                }
                if let Some(new) = next {
                    out.push((new, EventType::GotFocus));
                }
                self.apply_requests(tree, &mut out);
            }
        }
        out
    }

    /// Emits `KeyUp` to the focused element
    pub fn on_key_up(&mut self, tree: &ElementTree, key: Key, modifiers: Modifiers) -> Dispatched {
        let mut out = Dispatched::new();
        if let Some(focused) = self.focus.focused() {
            let ctx = self.context(EventType::KeyUp, focused).with_key(key, modifiers);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    /// Emits `TextInput` to the focused element
    pub fn on_text(&mut self, tree: &ElementTree, c: char) -> Dispatched {
        let mut out = Dispatched::new();
        if let Some(focused) = self.focus.focused() {
            let ctx = self.context(EventType::TextInput, focused).with_key_char(c);
            self.emit(tree, ctx, &mut out);
        }
        out
    }

    /// Route one platform input event
    pub fn handle_input(&mut self, tree: &ElementTree, root: NodeId, event: &InputEvent) -> Dispatched {
        match event {
            InputEvent::Mouse(MouseEvent::Moved { x, y }) => self.on_mouse_move(tree, root, *x, *y),
            InputEvent::Mouse(MouseEvent::ButtonPressed { button, x, y }) => {
                self.on_mouse_down(tree, root, *x, *y, *button)
            }
            InputEvent::Mouse(MouseEvent::ButtonReleased { button, x, y }) => {
                self.on_mouse_up(tree, root, *x, *y, *button)
            }
            InputEvent::Mouse(MouseEvent::Left) => self.on_mouse_leave(tree),
            InputEvent::Mouse(MouseEvent::Entered) => Dispatched::new(),
            InputEvent::Scroll { delta_x, delta_y, .. } => self.on_wheel(tree, root, *delta_x, *delta_y),
            InputEvent::Keyboard(KeyboardEvent {
                key,
                state: KeyState::Pressed,
                modifiers,
            }) => self.on_key_down(tree, root, key.clone(), *modifiers),
            InputEvent::Keyboard(KeyboardEvent {
                key,
                state: KeyState::Released,
                modifiers,
            }) => self.on_key_up(tree, key.clone(), *modifiers),
            InputEvent::Text(c) => self.on_text(tree, *c),
        }
    }

    /// Forget elements that were removed, hidden or disabled
    ///
    /// A hovered element that is still in the tree receives `PointerLeave`;
    /// a capture target receives `CaptureLost`.
    pub fn prune(&mut self, tree: &ElementTree) -> Dispatched {
        let mut out = Dispatched::new();
        let interactive = |id: NodeId| {
            tree.is_visible_in_tree(id) && tree.ancestors_inclusive(id).all(|a| tree.node(a).is_enabled())
        };

        if let Some(hovered) = self.hovered {
            if !interactive(hovered) {
                self.update_hover(tree, None, &mut out);
            }
        }
        if self.pressed.is_some_and(|id| !interactive(id)) {
            self.pressed = None;
        }
        if let Some(captured) = self.capture {
            if !tree.contains(captured) {
                self.capture = None;
            } else if !interactive(captured) {
                out.extend(self.release_capture(tree));
            }
        }

        let focused = self.focus.focused();
        self.focus.prune(tree);
        if let Some(old) = focused.filter(|id| self.focus.focused() != Some(*id) && tree.contains(*id)) {
            out.push((old, EventType::LostFocus));
        }
        self.apply_requests(tree, &mut out);
        out
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn live_capture(&mut self, tree: &ElementTree) -> Option<NodeId> {
        if self.capture.is_some_and(|id| !tree.contains(id)) {
            self.capture = None;
        }
        self.capture
    }

    fn update_hover(&mut self, tree: &ElementTree, target: Option<NodeId>, out: &mut Dispatched) {
        if self.hovered == target {
            return;
        }
        if let Some(old) = self.hovered.filter(|id| tree.contains(*id)) {
            let ctx = self.pointer_context(tree, EventType::PointerLeave, old);
            self.emit(tree, ctx, out);
        }
        self.hovered = target;
        if let Some(new) = target {
            let ctx = self.pointer_context(tree, EventType::PointerEnter, new);
            self.emit(tree, ctx, out);
        }
    }

    fn focus_into(&mut self, tree: &ElementTree, id: NodeId, out: &mut Dispatched) {
        let previous = self.focus.focused();
        if previous == Some(id) || !self.focus.request_focus(tree, id) {
            return;
        }
        if let Some(old) = previous {
            out.push((old, EventType::LostFocus));
        }
        out.push((id, EventType::GotFocus));
        self.apply_requests(tree, out);
    }

    fn context(&self, event_type: EventType, id: NodeId) -> EventContext {
        EventContext::new(event_type, id)
            .with_requests(self.requests.clone())
            .with_edits(self.edits.clone())
    }

    fn pointer_context(&self, tree: &ElementTree, event_type: EventType, id: NodeId) -> EventContext {
        let origin = tree.absolute_bounds(id).origin;
        self.context(event_type, id)
            .with_mouse_pos(self.mouse.x, self.mouse.y)
            .with_local_pos(self.mouse.x - origin.x, self.mouse.y - origin.y)
    }

    fn emit(&mut self, tree: &ElementTree, ctx: EventContext, out: &mut Dispatched) {
        self.dispatch(tree, &ctx, out);
    }

    fn dispatch(&mut self, tree: &ElementTree, ctx: &EventContext, out: &mut Dispatched) {
        tree.dispatch(ctx);
        out.push((ctx.node_id, ctx.event_type));
        self.apply_requests(tree, out);
    }

    /// Apply the capture and focus changes handlers queued
    fn apply_requests(&mut self, tree: &ElementTree, out: &mut Dispatched) {
        for request in self.requests.drain() {
            match request {
                RouterRequest::Capture(id) => {
                    let events = self.set_capture(tree, id);
                    out.extend(events);
                }
                RouterRequest::ReleaseCapture => {
                    let events = self.release_capture(tree);
                    out.extend(events);
                }
                RouterRequest::Focus(id) => self.focus_into(tree, id, out),
                RouterRequest::ReleaseFocus(id) => {
                    if self.focus.release_focus(tree, id) {
                        out.push((id, EventType::LostFocus));
                        self.apply_requests(tree, out);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn window() -> (ElementTree, NodeId) {
        let mut tree = ElementTree::new();
        let root = tree.insert(Element::new("window").with_bounds(Rect::new(0.0, 0.0, 400.0, 300.0)));
        (tree, root)
    }

    fn child(tree: &mut ElementTree, parent: NodeId, bounds: Rect) -> NodeId {
        tree.insert_child(parent, Element::new("child").with_bounds(bounds))
            .unwrap()
    }

    #[test]
    fn test_hit_test_basic() {
        let (mut tree, root) = window();
        let first = child(&mut tree, root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let second = child(&mut tree, root, Rect::new(0.0, 100.0, 100.0, 100.0));

        let hit = hit_test(&tree, root, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit.node, first);
        let hit = hit_test(&tree, root, Point::new(50.0, 150.0)).unwrap();
        assert_eq!(hit.node, second);
        assert_eq!((hit.local_x, hit.local_y), (50.0, 50.0));
        assert_eq!(hit.ancestors.as_slice(), &[root, second]);

        assert!(hit_test(&tree, root, Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_higher_z_wins() {
        let (mut tree, root) = window();
        let below = child(&mut tree, root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = child(&mut tree, root, Rect::new(50.0, 50.0, 100.0, 100.0));
        let overlap = Point::new(75.0, 75.0);

        // Later insertion wins the tie
        assert_eq!(hit_test(&tree, root, overlap).unwrap().node, above);

        tree.bring_to_front(below);
        assert_eq!(hit_test(&tree, root, overlap).unwrap().node, below);
    }

    #[test]
    fn test_hidden_leaves_hit_testing_immediately() {
        let (mut tree, root) = window();
        let panel = child(&mut tree, root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let passes = tree.layout_state(panel).passes();

        tree.set_visible(panel, false);
        assert_eq!(hit_test(&tree, root, Point::new(10.0, 10.0)).unwrap().node, root);
        assert_eq!(tree.layout_state(panel).passes(), passes);
    }

    #[test]
    fn test_children_clipped_to_parent() {
        let (mut tree, root) = window();
        let panel = child(&mut tree, root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let overflow = child(&mut tree, panel, Rect::new(50.0, 50.0, 100.0, 100.0));

        assert_eq!(hit_test(&tree, root, Point::new(60.0, 60.0)).unwrap().node, overflow);
        assert_eq!(hit_test(&tree, root, Point::new(120.0, 120.0)).unwrap().node, root);
    }

    #[test]
    fn test_hover_enter_leave() {
        let (mut tree, root) = window();
        let a = child(&mut tree, root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut router = EventRouter::new();

        let events = router.on_mouse_move(&tree, root, 50.0, 50.0);
        assert_eq!(events, vec![(a, EventType::PointerEnter), (a, EventType::PointerMove)]);

        let events = router.on_mouse_move(&tree, root, 200.0, 50.0);
        assert_eq!(
            events,
            vec![
                (a, EventType::PointerLeave),
                (root, EventType::PointerEnter),
                (root, EventType::PointerMove),
            ]
        );

        let events = router.on_mouse_leave(&tree);
        assert_eq!(events, vec![(root, EventType::PointerLeave)]);
        assert_eq!(router.hovered(), None);
    }

    #[test]
    fn test_click_requires_same_element() {
        let (mut tree, root) = window();
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&clicks);
        let button = tree
            .insert_child(
                root,
                Element::new("button")
                    .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0))
                    .on_click(move |ctx| log.borrow_mut().push((ctx.local_x, ctx.local_y))),
            )
            .unwrap();

        let mut router = EventRouter::new();
        router.on_mouse_down(&tree, root, 50.0, 50.0, MouseButton::Left);
        let events = router.on_mouse_up(&tree, root, 55.0, 55.0, MouseButton::Left);
        assert_eq!(events, vec![(button, EventType::PointerUp), (button, EventType::Click)]);
        assert_eq!(*clicks.borrow(), vec![(55.0, 55.0)]);

        // Released elsewhere: PointerUp still goes to the pressed element, no click
        router.on_mouse_down(&tree, root, 50.0, 50.0, MouseButton::Left);
        let events = router.on_mouse_up(&tree, root, 300.0, 200.0, MouseButton::Left);
        assert_eq!(events, vec![(button, EventType::PointerUp)]);
        assert_eq!(clicks.borrow().len(), 1);
    }

    #[test]
    fn test_mouse_down_focuses_nearest_tab_stop() {
        let (mut tree, root) = window();
        let field = tree
            .insert_child(
                root,
                Element::new("field")
                    .with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0))
                    .with_tab_stop(0),
            )
            .unwrap();
        let glyph = child(&mut tree, field, Rect::new(10.0, 10.0, 20.0, 20.0));

        let mut router = EventRouter::new();
        let events = router.on_mouse_down(&tree, root, 15.0, 15.0, MouseButton::Left);
        assert_eq!(events, vec![(field, EventType::GotFocus), (glyph, EventType::PointerDown)]);
        assert_eq!(router.focused(), Some(field));

        // Pressing on something unfocusable keeps focus
        router.on_mouse_down(&tree, root, 300.0, 200.0, MouseButton::Left);
        assert_eq!(router.focused(), Some(field));
    }

    #[test]
    fn test_wheel_bubbles_only_on_opt_in() {
        let (mut tree, root) = window();
        let list = child(&mut tree, root, Rect::new(0.0, 0.0, 200.0, 200.0));
        let row = tree
            .insert_child(
                list,
                Element::new("row")
                    .with_bounds(Rect::new(0.0, 0.0, 200.0, 20.0))
                    .with_bubble_wheel(),
            )
            .unwrap();
        let label = child(&mut tree, row, Rect::new(0.0, 0.0, 50.0, 20.0));

        let mut router = EventRouter::new();
        router.on_mouse_move(&tree, root, 10.0, 10.0);

        // The label did not opt in, so the wheel stops there
        let events = router.on_wheel(&tree, root, 0.0, -3.0);
        assert_eq!(events, vec![(label, EventType::Wheel)]);

        // Over the row itself the wheel bubbles to the list and stops
        router.on_mouse_move(&tree, root, 100.0, 10.0);
        let events = router.on_wheel(&tree, root, 0.0, -3.0);
        assert_eq!(events, vec![(row, EventType::Wheel), (list, EventType::Wheel)]);
    }

    #[test]
    fn test_handled_wheel_does_not_bubble() {
        let (mut tree, root) = window();
        let row = tree
            .insert_child(
                root,
                Element::new("row")
                    .with_bounds(Rect::new(0.0, 0.0, 200.0, 20.0))
                    .with_bubble_wheel()
                    .on(EventType::Wheel, |ctx| ctx.set_handled()),
            )
            .unwrap();

        let mut router = EventRouter::new();
        router.on_mouse_move(&tree, root, 10.0, 10.0);
        let events = router.on_wheel(&tree, root, 0.0, 1.0);
        assert_eq!(events, vec![(row, EventType::Wheel)]);
    }

    #[test]
    fn test_capture_takes_pointer_input() {
        let (mut tree, root) = window();
        let slider = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 50.0));
        let other = child(&mut tree, root, Rect::new(100.0, 0.0, 50.0, 50.0));

        let mut router = EventRouter::new();
        router.set_capture(&tree, slider);
        let events = router.on_mouse_move(&tree, root, 120.0, 10.0);
        assert_eq!(events, vec![(slider, EventType::PointerMove)]);

        let events = router.set_capture(&tree, other);
        assert_eq!(events, vec![(slider, EventType::CaptureLost)]);

        let events = router.release_capture(&tree);
        assert_eq!(events, vec![(other, EventType::CaptureLost)]);
        assert_eq!(router.capture(), None);
    }

    #[test]
    fn test_keys_go_to_focused_and_tab_moves_focus() {
        let (mut tree, root) = window();
        let keys = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&keys);
        let first = tree
            .insert_child(
                root,
                Element::new("first")
                    .with_tab_stop(0)
                    .on(EventType::KeyDown, move |ctx| log.borrow_mut().push(ctx.key.clone())),
            )
            .unwrap();
        let second = tree
            .insert_child(root, Element::new("second").with_tab_stop(1))
            .unwrap();

        let mut router = EventRouter::new();
        // Nothing focused yet: Tab focuses the first stop
        let events = router.on_key_down(&tree, root, Key::Tab, Modifiers::default());
        assert_eq!(events, vec![(first, EventType::GotFocus)]);

        router.on_key_down(&tree, root, Key::Char('a'), Modifiers::default());
        assert_eq!(*keys.borrow(), vec![Some(Key::Char('a'))]);

        let events = router.on_key_down(&tree, root, Key::Tab, Modifiers::default());
        assert_eq!(
            events,
            vec![
                (first, EventType::KeyDown),
                (first, EventType::LostFocus),
                (second, EventType::GotFocus),
            ]
        );

        router.on_key_down(&tree, root, Key::Tab, Modifiers::SHIFT);
        assert_eq!(router.focused(), Some(first));
    }

    #[test]
    fn test_prune_after_removal() {
        let (mut tree, root) = window();
        let a = tree
            .insert_child(
                root,
                Element::new("a")
                    .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0))
                    .with_tab_stop(0),
            )
            .unwrap();

        let mut router = EventRouter::new();
        router.on_mouse_move(&tree, root, 10.0, 10.0);
        router.on_mouse_down(&tree, root, 10.0, 10.0, MouseButton::Left);
        router.set_capture(&tree, a);
        tree.remove(a).unwrap();

        let events = router.prune(&tree);
        assert!(events.is_empty());
        assert_eq!(router.hovered(), None);
        assert_eq!(router.pressed(), None);
        assert_eq!(router.capture(), None);
        assert_eq!(router.focused(), None);
    }

    #[test]
    fn test_captured_release_outside_still_clicks() {
        let (mut tree, root) = window();
        let slider = child(&mut tree, root, Rect::new(0.0, 0.0, 50.0, 50.0));
        let other = child(&mut tree, root, Rect::new(100.0, 0.0, 50.0, 50.0));

        let mut router = EventRouter::new();
        router.on_mouse_down(&tree, root, 10.0, 10.0, MouseButton::Left);
        router.set_capture(&tree, slider);
        router.on_mouse_move(&tree, root, 200.0, 10.0);
        let events = router.on_mouse_up(&tree, root, 200.0, 10.0, MouseButton::Left);
        assert_eq!(events, vec![(slider, EventType::PointerUp), (slider, EventType::Click)]);

        // Capture moved elsewhere during the press: no click for either
        router.release_capture(&tree);
        router.on_mouse_down(&tree, root, 10.0, 10.0, MouseButton::Left);
        router.set_capture(&tree, other);
        let events = router.on_mouse_up(&tree, root, 10.0, 10.0, MouseButton::Left);
        assert_eq!(events, vec![(other, EventType::PointerUp)]);
    }

    #[test]
    fn test_handler_drag_captures_pointer() {
        let (mut tree, root) = window();
        let moves = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&moves);
        let slider = tree
            .insert_child(
                root,
                Element::new("slider")
                    .with_bounds(Rect::new(0.0, 0.0, 50.0, 50.0))
                    .on(EventType::PointerDown, |ctx| ctx.capture_pointer())
                    .on(EventType::PointerMove, move |ctx| log.borrow_mut().push(ctx.local_x))
                    .on(EventType::PointerUp, |ctx| ctx.release_capture()),
            )
            .unwrap();

        let mut router = EventRouter::new();
        let events = router.on_mouse_down(&tree, root, 10.0, 10.0, MouseButton::Left);
        assert_eq!(events, vec![(slider, EventType::PointerDown)]);
        assert_eq!(router.capture(), Some(slider));

        let events = router.on_mouse_move(&tree, root, 200.0, 10.0);
        assert_eq!(events, vec![(slider, EventType::PointerMove)]);
        assert_eq!(*moves.borrow(), vec![200.0]);

        let events = router.on_mouse_up(&tree, root, 200.0, 10.0, MouseButton::Left);
        assert_eq!(
            events,
            vec![
                (slider, EventType::PointerUp),
                (slider, EventType::CaptureLost),
                (slider, EventType::Click),
            ]
        );
        assert_eq!(router.capture(), None);
    }

    #[test]
    fn test_handler_moves_focus() {
        let (mut tree, root) = window();
        let field = tree
            .insert_child(root, Element::new("field").with_tab_stop(0))
            .unwrap();
        let label = tree
            .insert_child(
                root,
                Element::new("label")
                    .with_bounds(Rect::new(0.0, 0.0, 50.0, 20.0))
                    .on_click(move |ctx| ctx.request_focus_on(field)),
            )
            .unwrap();

        let mut router = EventRouter::new();
        router.on_mouse_down(&tree, root, 10.0, 10.0, MouseButton::Left);
        let events = router.on_mouse_up(&tree, root, 10.0, 10.0, MouseButton::Left);
        assert_eq!(
            events,
            vec![
                (label, EventType::PointerUp),
                (label, EventType::Click),
                (field, EventType::GotFocus),
            ]
        );
        assert_eq!(router.focused(), Some(field));
    }

    #[test]
    fn test_deferred_edits_wait_for_the_tree_owner() {
        let (mut tree, root) = window();
        let banner = child(&mut tree, root, Rect::new(0.0, 100.0, 50.0, 20.0));
        let close = tree
            .insert_child(
                root,
                Element::new("close")
                    .with_bounds(Rect::new(0.0, 0.0, 20.0, 20.0))
                    .on_click(move |ctx| ctx.defer(move |tree| tree.set_visible(banner, false))),
            )
            .unwrap();

        let mut router = EventRouter::new();
        router.on_mouse_down(&tree, root, 5.0, 5.0, MouseButton::Left);
        let events = router.on_mouse_up(&tree, root, 5.0, 5.0, MouseButton::Left);
        assert_eq!(events.last(), Some(&(close, EventType::Click)));
        assert!(tree.node(banner).is_visible());
        assert_eq!(router.deferred().len(), 1);

        assert_eq!(router.apply_deferred(&mut tree), 1);
        assert!(!tree.node(banner).is_visible());
        assert!(router.deferred().is_empty());
    }
}
