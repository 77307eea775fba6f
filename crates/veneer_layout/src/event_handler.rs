//! Event handler storage for elements
//!
//! Handlers are closures stored per element and keyed by [`EventType`]. The
//! [`EventRouter`](crate::event_router::EventRouter) builds an
//! [`EventContext`] and dispatches it to the target element's handlers.
//!
//! Handlers only see the tree read-only. Changes to router state (pointer
//! capture, focus) are queued on the context and applied by the router as
//! soon as the handler returns. Tree edits are deferred the same way and
//! applied once routing is done.
//!
//! ```
//! use veneer_layout::prelude::*;
//!
//! let mut handlers = EventHandlers::new();
//! handlers.on_click(|ctx| ctx.set_handled());
//! assert!(handlers.has_handler(EventType::Click));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use veneer_platform::{Key, Modifiers, MouseButton};

use crate::tree::{ElementTree, NodeId};

/// Element-level event types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerEnter,
    PointerLeave,
    PointerMove,
    PointerDown,
    PointerUp,
    /// Press and release on the same element
    Click,
    Wheel,
    KeyDown,
    KeyUp,
    TextInput,
    GotFocus,
    LostFocus,
    /// Pointer capture was taken away from the element
    CaptureLost,
}

/// Router state change queued by an event handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterRequest {
    /// Send all pointer input to the element
    Capture(NodeId),
    ReleaseCapture,
    Focus(NodeId),
    /// Drop focus if the element holds it
    ReleaseFocus(NodeId),
}

/// Shared queue of [`RouterRequest`]s
///
/// Cloning shares the queue, like [`Invalidator`](crate::invalidation::Invalidator).
#[derive(Clone, Debug, Default)]
pub struct RequestQueue {
    inner: Rc<RefCell<SmallVec<[RouterRequest; 2]>>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: RouterRequest) {
        self.inner.borrow_mut().push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Take every queued request, oldest first
    pub fn drain(&self) -> SmallVec<[RouterRequest; 2]> {
        std::mem::take(&mut *self.inner.borrow_mut())
    }
}

/// A tree edit queued by a handler
pub type TreeEdit = Box<dyn FnOnce(&mut ElementTree)>;

/// Shared queue of [`TreeEdit`]s, applied in order after routing
#[derive(Clone, Default)]
pub struct DeferredEdits {
    inner: Rc<RefCell<Vec<TreeEdit>>>,
}

impl DeferredEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, edit: TreeEdit) {
        self.inner.borrow_mut().push(edit);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Run every queued edit against `tree`; returns how many ran
    ///
    /// Edits queued while applying wait for the next call.
    pub fn apply(&self, tree: &mut ElementTree) -> usize {
        let edits = std::mem::take(&mut *self.inner.borrow_mut());
        let count = edits.len();
        for edit in edits {
            edit(tree);
        }
        count
    }
}

impl fmt::Debug for DeferredEdits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredEdits").field("len", &self.len()).finish()
    }
}

/// Callback for handling events
///
/// Uses Rc since UI is single-threaded.
pub type EventCallback = Rc<dyn Fn(&EventContext)>;

/// Context passed to event handlers
#[derive(Clone, Debug)]
pub struct EventContext {
    pub event_type: EventType,
    /// The element receiving the event
    pub node_id: NodeId,
    /// Pointer position in window client coordinates
    pub mouse_x: f32,
    pub mouse_y: f32,
    /// Pointer position relative to the element's origin
    pub local_x: f32,
    pub local_y: f32,
    pub button: Option<MouseButton>,
    pub scroll_delta_x: f32,
    pub scroll_delta_y: f32,
    pub key: Option<Key>,
    pub key_char: Option<char>,
    pub modifiers: Modifiers,
    handled: Cell<bool>,
    requests: RequestQueue,
    edits: DeferredEdits,
}

impl EventContext {
    pub fn new(event_type: EventType, node_id: NodeId) -> Self {
        Self {
            event_type,
            node_id,
            mouse_x: 0.0,
            mouse_y: 0.0,
            local_x: 0.0,
            local_y: 0.0,
            button: None,
            scroll_delta_x: 0.0,
            scroll_delta_y: 0.0,
            key: None,
            key_char: None,
            modifiers: Modifiers::default(),
            handled: Cell::new(false),
            requests: RequestQueue::default(),
            edits: DeferredEdits::default(),
        }
    }

    /// Queue router requests on `requests` instead of a private queue
    pub fn with_requests(mut self, requests: RequestQueue) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_edits(mut self, edits: DeferredEdits) -> Self {
        self.edits = edits;
        self
    }

    pub fn with_mouse_pos(mut self, x: f32, y: f32) -> Self {
        self.mouse_x = x;
        self.mouse_y = y;
        self
    }

    pub fn with_local_pos(mut self, x: f32, y: f32) -> Self {
        self.local_x = x;
        self.local_y = y;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_scroll_delta(mut self, dx: f32, dy: f32) -> Self {
        self.scroll_delta_x = dx;
        self.scroll_delta_y = dy;
        self
    }

    pub fn with_key(mut self, key: Key, modifiers: Modifiers) -> Self {
        self.key = Some(key);
        self.modifiers = modifiers;
        self
    }

    pub fn with_key_char(mut self, c: char) -> Self {
        self.key_char = Some(c);
        self
    }

    /// Retarget the same event at another element (used for wheel bubbling)
    pub fn retarget(&self, node_id: NodeId, local_x: f32, local_y: f32) -> Self {
        let mut ctx = self.clone();
        ctx.node_id = node_id;
        ctx.local_x = local_x;
        ctx.local_y = local_y;
        ctx.handled.set(false);
        ctx
    }

    /// Mark the event as consumed
    pub fn set_handled(&self) {
        self.handled.set(true);
    }

    pub fn is_handled(&self) -> bool {
        self.handled.get()
    }

    /// Capture the pointer for the receiving element
    pub fn capture_pointer(&self) {
        self.requests.push(RouterRequest::Capture(self.node_id));
    }

    pub fn release_capture(&self) {
        self.requests.push(RouterRequest::ReleaseCapture);
    }

    /// Focus the receiving element
    pub fn request_focus(&self) {
        self.request_focus_on(self.node_id);
    }

    pub fn request_focus_on(&self, id: NodeId) {
        self.requests.push(RouterRequest::Focus(id));
    }

    pub fn release_focus(&self) {
        self.requests.push(RouterRequest::ReleaseFocus(self.node_id));
    }

    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Change the tree once routing is done
    ///
    /// ```
    /// use veneer_layout::prelude::*;
    ///
    /// let mut tree = ElementTree::new();
    /// let badge = tree.insert(Element::new("badge"));
    /// let edits = DeferredEdits::new();
    ///
    /// let ctx = EventContext::new(EventType::Click, badge).with_edits(edits.clone());
    /// ctx.defer(move |tree| tree.set_visible(badge, false));
    /// assert_eq!(edits.apply(&mut tree), 1);
    /// assert!(!tree.node(badge).is_visible());
    /// ```
    pub fn defer<F>(&self, edit: F)
    where
        F: FnOnce(&mut ElementTree) + 'static,
    {
        self.edits.push(Box::new(edit));
    }
}

/// Storage for event handlers on an element
#[derive(Default, Clone)]
pub struct EventHandlers {
    handlers: FxHashMap<EventType, SmallVec<[EventCallback; 1]>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Register a handler for an event type
    pub fn on<F>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Handlers for an event type, cloned so dispatch holds no borrow
    pub fn get(&self, event_type: EventType) -> SmallVec<[EventCallback; 1]> {
        self.handlers.get(&event_type).cloned().unwrap_or_default()
    }

    /// Dispatch an event to all registered handlers for that type
    pub fn dispatch(&self, ctx: &EventContext) {
        if let Some(handlers) = self.handlers.get(&ctx.event_type) {
            for handler in handlers {
                handler(ctx);
            }
        }
    }

    pub fn on_click<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::Click, handler);
    }

    pub fn on_mouse_down<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::PointerDown, handler);
    }

    pub fn on_mouse_up<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::PointerUp, handler);
    }

    pub fn on_hover_enter<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::PointerEnter, handler);
    }

    pub fn on_hover_leave<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::PointerLeave, handler);
    }

    pub fn on_wheel<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::Wheel, handler);
    }

    pub fn on_key_down<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::KeyDown, handler);
    }

    pub fn on_focus<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::GotFocus, handler);
    }

    pub fn on_blur<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::LostFocus, handler);
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;
    use std::cell::RefCell;

    fn node() -> NodeId {
        NodeId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_dispatch_runs_handlers_in_registration_order() {
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = EventHandlers::new();
        for i in 0..3 {
            let log = Rc::clone(&log);
            handlers.on_click(move |_| log.borrow_mut().push(i));
        }

        handlers.dispatch(&EventContext::new(EventType::Click, node()));
        handlers.dispatch(&EventContext::new(EventType::KeyDown, node()));
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_requests_share_the_router_queue() {
        let queue = RequestQueue::new();
        let ctx = EventContext::new(EventType::PointerDown, node()).with_requests(queue.clone());
        ctx.capture_pointer();
        ctx.request_focus();

        let retargeted = ctx.retarget(node(), 0.0, 0.0);
        retargeted.release_capture();

        assert_eq!(
            queue.drain().as_slice(),
            &[
                RouterRequest::Capture(node()),
                RouterRequest::Focus(node()),
                RouterRequest::ReleaseCapture,
            ]
        );
        assert!(!ctx.has_requests());
    }

    #[test]
    fn test_handled_flag_resets_on_retarget() {
        let ctx = EventContext::new(EventType::Wheel, node()).with_scroll_delta(0.0, -3.0);
        ctx.set_handled();
        let retargeted = ctx.retarget(node(), 1.0, 2.0);
        assert!(ctx.is_handled());
        assert!(!retargeted.is_handled());
        assert_eq!(retargeted.scroll_delta_y, -3.0);
    }
}
