//! Keyboard focus
//!
//! The focused element is held by a [`FocusContext`] rather than flagged on
//! nodes, so there is exactly one place that can change it. Requests are
//! last-wins: the previous element receives `LostFocus` before the new one
//! receives `GotFocus`.

use crate::event_handler::{DeferredEdits, EventContext, EventType, RequestQueue};
use crate::tree::{ElementTree, NodeId};

#[derive(Clone, Debug, Default)]
pub struct FocusContext {
    focused: Option<NodeId>,
    requests: Option<RequestQueue>,
    edits: Option<DeferredEdits>,
}

impl FocusContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus events carry the router's queues, so their handlers can reach it
    pub(crate) fn with_queues(requests: RequestQueue, edits: DeferredEdits) -> Self {
        Self {
            focused: None,
            requests: Some(requests),
            edits: Some(edits),
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, id: NodeId) -> bool {
        self.focused == Some(id)
    }

    /// Move focus to `id`
    ///
    /// Returns `false` and leaves focus unchanged when the element cannot
    /// take focus (not a tab stop, or hidden/disabled along its ancestry).
    pub fn request_focus(&mut self, tree: &ElementTree, id: NodeId) -> bool {
        if !tree.can_focus(id) {
            tracing::debug!(?id, "focus request refused");
            return false;
        }
        if self.focused == Some(id) {
            return true;
        }
        self.transfer(tree, Some(id));
        true
    }

    /// Drop focus if `id` holds it
    pub fn release_focus(&mut self, tree: &ElementTree, id: NodeId) -> bool {
        if self.focused != Some(id) {
            return false;
        }
        self.transfer(tree, None);
        true
    }

    /// Drop focus unconditionally
    pub fn clear(&mut self, tree: &ElementTree) {
        if self.focused.is_some() {
            self.transfer(tree, None);
        }
    }

    /// Clear focus held by an element that was removed or can no longer focus
    pub fn prune(&mut self, tree: &ElementTree) {
        match self.focused {
            Some(id) if !tree.contains(id) => {
                tracing::debug!(?id, "focused element removed");
                self.focused = None;
            }
            Some(id) if !tree.can_focus(id) => self.transfer(tree, None),
            _ => {}
        }
    }

    /// Focus the next (or previous) tab stop under `root`
    ///
    /// Tab stops are ordered by `tab_index`, ties by tree order, and the
    /// walk wraps around. Returns the newly focused element.
    pub fn move_focus(&mut self, tree: &ElementTree, root: NodeId, reverse: bool) -> Option<NodeId> {
        let order = tab_order(tree, root);
        if order.is_empty() {
            return None;
        }

        let current = self.focused.and_then(|f| order.iter().position(|id| *id == f));
        let len = order.len();
        let next = match (current, reverse) {
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };

        let target = order[next];
        if self.focused != Some(target) {
            self.transfer(tree, Some(target));
        }
        Some(target)
    }

    fn transfer(&mut self, tree: &ElementTree, next: Option<NodeId>) {
        let previous = std::mem::replace(&mut self.focused, next);
        tracing::debug!(?previous, ?next, "focus changed");

        if let Some(old) = previous.filter(|id| tree.contains(*id)) {
            tree.dispatch(&self.context(EventType::LostFocus, old));
            tree.invalidate(old);
        }
        if let Some(new) = next {
            tree.dispatch(&self.context(EventType::GotFocus, new));
            tree.invalidate(new);
        }
    }

    fn context(&self, event_type: EventType, id: NodeId) -> EventContext {
        let mut ctx = EventContext::new(event_type, id);
        if let Some(requests) = &self.requests {
            ctx = ctx.with_requests(requests.clone());
        }
        if let Some(edits) = &self.edits {
            ctx = ctx.with_edits(edits.clone());
        }
        ctx
    }
}

/// Focusable elements under `root` in tab order
pub fn tab_order(tree: &ElementTree, root: NodeId) -> Vec<NodeId> {
    let mut stops: Vec<NodeId> = tree
        .descendants(root)
        .into_iter()
        .filter(|id| tree.can_focus(*id))
        .collect();
    stops.sort_by_key(|id| tree.node(*id).tab_index());
    stops
}
