//! Paint invalidation
//!
//! Layout, animation callbacks and paint callbacks all report "this element
//! needs repainting" through the same channel. The [`Invalidator`] is a
//! cheap clonable handle onto a shared [`DirtyTracker`]; the root window
//! drains it once per turn and turns a non-empty set into a redraw request.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::tree::NodeId;

/// Tracks which elements need repainting
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: FxHashSet<NodeId>,
    /// Set when something outside any single element changed (resize)
    full_repaint: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as dirty (needs repaint)
    pub fn mark(&mut self, id: NodeId) {
        self.dirty.insert(id);
    }

    pub fn mark_all(&mut self) {
        self.full_repaint = true;
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.full_repaint || self.dirty.contains(&id)
    }

    /// Check if anything needs repainting
    pub fn has_dirty(&self) -> bool {
        self.full_repaint || !self.dirty.is_empty()
    }

    /// Take all dirty node IDs (clears the tracker)
    pub fn take_dirty(&mut self) -> Vec<NodeId> {
        self.full_repaint = false;
        self.dirty.drain().collect()
    }

    pub fn clear(&mut self) {
        self.full_repaint = false;
        self.dirty.clear();
    }
}

/// Shared handle for pushing paint invalidation
#[derive(Clone, Debug, Default)]
pub struct Invalidator {
    inner: Rc<RefCell<DirtyTracker>>,
}

impl Invalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a repaint of `id`
    pub fn invalidate(&self, id: NodeId) {
        self.inner.borrow_mut().mark(id);
    }

    pub fn invalidate_all(&self) {
        self.inner.borrow_mut().mark_all();
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.inner.borrow().is_dirty(id)
    }

    pub fn needs_paint(&self) -> bool {
        self.inner.borrow().has_dirty()
    }

    pub fn take_dirty(&self) -> Vec<NodeId> {
        self.inner.borrow_mut().take_dirty()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_clones_share_state() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let a = ids.insert(());

        let invalidator = Invalidator::new();
        let from_callback = invalidator.clone();
        from_callback.invalidate(a);

        assert!(invalidator.needs_paint());
        assert!(invalidator.is_dirty(a));
        assert_eq!(invalidator.take_dirty(), vec![a]);
        assert!(!invalidator.needs_paint());
    }

    #[test]
    fn test_mark_all() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_all();
        assert!(tracker.has_dirty());
        assert!(tracker.take_dirty().is_empty());
        assert!(!tracker.has_dirty());
    }
}
