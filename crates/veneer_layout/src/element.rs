//! Element nodes
//!
//! An [`Element`] is built with the `with_*` methods below and then handed
//! to an [`ElementTree`](crate::tree::ElementTree), which owns it from then
//! on. After insertion every mutation goes through the tree so that layout
//! and paint invalidation follow automatically.
//!
//! ```
//! use veneer_layout::prelude::*;
//! use veneer_core::Rect;
//!
//! let mut tree = ElementTree::new();
//! let root = tree.insert(Element::new("window").with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)));
//! let header = tree
//!     .insert_child(root, Element::new("header").with_bounds(Rect::new(0.0, 0.0, 0.0, 24.0)).with_dock(Dock::Top))
//!     .unwrap();
//! assert_eq!(tree.bounds(header), Rect::new(0.0, 0.0, 100.0, 24.0));
//! ```

use std::fmt;
use std::rc::Rc;

use veneer_core::{DrawContext, Padding, Point, Rect, Size};

use crate::capability::{ElementView, HitTestable, Layoutable, Paintable};
use crate::event_handler::{EventContext, EventHandlers, EventType};
use crate::layout::{Anchor, Dock, LayoutMode, LayoutState};
use crate::properties::{
    Property, PropertyStore, ANCHOR, BUBBLE_WHEEL, DOCK, LAYER_OPACITY, PADDING, SPECIFIED_BOUNDS,
};
use crate::tree::NodeId;

/// Diagnostic descriptor of what an element is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    #[default]
    Container,
    Panel,
    /// Widget kinds defined outside the core
    Custom(&'static str),
}

/// One node of the element tree
pub struct Element {
    pub(crate) name: String,
    pub(crate) kind: ElementKind,
    /// Relative to the parent's client origin
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) z_index: i32,
    pub(crate) tab_stop: bool,
    pub(crate) tab_index: i32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) properties: PropertyStore,
    pub(crate) layout: LayoutState,
    pub(crate) handlers: EventHandlers,
    pub(crate) painter: Option<Rc<dyn Paintable>>,
    pub(crate) layout_hook: Option<Rc<dyn Layoutable>>,
    pub(crate) hit_shape: Option<Rc<dyn HitTestable>>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::default(),
            bounds: Rect::ZERO,
            visible: true,
            enabled: true,
            z_index: 0,
            tab_stop: false,
            tab_index: 0,
            parent: None,
            children: Vec::new(),
            properties: PropertyStore::new(),
            layout: LayoutState::default(),
            handlers: EventHandlers::new(),
            painter: None,
            layout_hook: None,
            hit_shape: None,
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Initial bounds; also recorded as the specified bounds docks size from
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self.properties.set(SPECIFIED_BOUNDS, bounds);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Make the element focusable and part of tab navigation
    pub fn with_tab_stop(mut self, tab_index: i32) -> Self {
        self.tab_stop = true;
        self.tab_index = tab_index;
        self
    }

    pub fn with_dock(mut self, dock: Dock) -> Self {
        self.properties.set(DOCK, dock);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.properties.set(ANCHOR, anchor);
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.properties.set(PADDING, padding.into());
        self
    }

    pub fn with_layer_opacity(mut self, opacity: f32) -> Self {
        self.properties.set(LAYER_OPACITY, opacity.clamp(0.0, 1.0));
        self
    }

    pub fn with_bubble_wheel(mut self) -> Self {
        self.properties.set(BUBBLE_WHEEL, true);
        self
    }

    pub fn with_property<T: 'static>(mut self, key: Property<T>, value: T) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn on_paint<F>(mut self, paint: F) -> Self
    where
        F: Fn(&ElementView<'_>, &mut dyn DrawContext) + 'static,
    {
        self.painter = Some(Rc::new(paint));
        self
    }

    pub fn on_layout<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut crate::tree::ElementTree, NodeId, Rect) + 'static,
    {
        self.layout_hook = Some(Rc::new(hook));
        self
    }

    pub fn with_hit_shape<F>(mut self, shape: F) -> Self
    where
        F: Fn(Point, Size) -> bool + 'static,
    {
        self.hit_shape = Some(Rc::new(shape));
        self
    }

    pub fn on<F>(mut self, event_type: EventType, handler: F) -> Self
    where
        F: Fn(&EventContext) + 'static,
    {
        self.handlers.on(event_type, handler);
        self
    }

    pub fn on_click<F>(self, handler: F) -> Self
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(EventType::Click, handler)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn tab_stop(&self) -> bool {
        self.tab_stop
    }

    pub fn tab_index(&self) -> i32 {
        self.tab_index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    pub fn dock(&self) -> Dock {
        self.properties.get_or_default(DOCK)
    }

    pub fn anchor(&self) -> Anchor {
        self.properties.get_or_default(ANCHOR)
    }

    pub fn padding(&self) -> Padding {
        self.properties.get_or_default(PADDING)
    }

    pub fn layer_opacity(&self) -> Option<f32> {
        self.properties.get(LAYER_OPACITY).copied()
    }

    pub fn bubbles_wheel(&self) -> bool {
        self.properties.get_or_default(BUBBLE_WHEEL)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        LayoutMode::resolve(self.dock(), self.anchor())
    }

    pub fn layout_state(&self) -> &LayoutState {
        &self.layout
    }

    pub fn painter(&self) -> Option<&Rc<dyn Paintable>> {
        self.painter.as_ref()
    }

    pub(crate) fn accepts_point(&self, local: Point) -> bool {
        match &self.hit_shape {
            Some(shape) => shape.hit_test(local, self.bounds.size),
            None => true,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bounds", &self.bounds)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("z_index", &self.z_index)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_specified_bounds() {
        let element = Element::new("header").with_bounds(Rect::new(0.0, 0.0, 10.0, 24.0));
        assert_eq!(
            element.properties().get(SPECIFIED_BOUNDS),
            Some(&Rect::new(0.0, 0.0, 10.0, 24.0))
        );
    }

    #[test]
    fn test_dock_overrides_anchor() {
        let element = Element::new("e")
            .with_anchor(Anchor::LEFT | Anchor::RIGHT)
            .with_dock(Dock::Bottom);
        assert_eq!(element.layout_mode(), LayoutMode::Docked(Dock::Bottom));

        let manual = Element::new("m").with_anchor(Anchor::NONE);
        assert_eq!(manual.layout_mode(), LayoutMode::Manual);
        assert_eq!(
            Element::new("d").layout_mode(),
            LayoutMode::Anchored(Anchor::TOP | Anchor::LEFT)
        );
    }

    #[test]
    fn test_hit_shape() {
        let round = Element::new("round")
            .with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_hit_shape(|p: Point, s: Size| {
                let dx = p.x - s.width / 2.0;
                let dy = p.y - s.height / 2.0;
                dx * dx + dy * dy <= 25.0
            });
        assert!(round.accepts_point(Point::new(5.0, 5.0)));
        assert!(!round.accepts_point(Point::new(0.5, 0.5)));
    }
}
