//! Capabilities an element can opt into
//!
//! Instead of a widget base class with virtual paint and layout methods,
//! an element carries optional trait objects for the behaviour it needs.
//! Closures with the matching signature implement each trait, so most
//! widgets never name these traits at all.

use veneer_core::{DrawContext, Point, Rect, Size};

use crate::element::{Element, ElementKind};
use crate::invalidation::Invalidator;
use crate::properties::Property;
use crate::tree::{ElementTree, NodeId};

/// Draws an element
///
/// The context is already translated to the element's origin and clipped
/// to its bounds.
pub trait Paintable {
    fn paint(&self, element: &ElementView<'_>, ctx: &mut dyn DrawContext);
}

impl<F> Paintable for F
where
    F: Fn(&ElementView<'_>, &mut dyn DrawContext),
{
    fn paint(&self, element: &ElementView<'_>, ctx: &mut dyn DrawContext) {
        self(element, ctx)
    }
}

/// Custom placement run after dock and anchor resolution
///
/// Runs while the container is arranging, so layout requests for the
/// container itself are ignored.
pub trait Layoutable {
    fn on_layout(&self, tree: &mut ElementTree, id: NodeId, display: Rect);
}

impl<F> Layoutable for F
where
    F: Fn(&mut ElementTree, NodeId, Rect),
{
    fn on_layout(&self, tree: &mut ElementTree, id: NodeId, display: Rect) {
        self(tree, id, display)
    }
}

/// Refines hit-testing inside an element's bounds (round buttons, holes)
pub trait HitTestable {
    /// `local` is relative to the element origin and already inside `size`
    fn hit_test(&self, local: Point, size: Size) -> bool;
}

impl<F> HitTestable for F
where
    F: Fn(Point, Size) -> bool,
{
    fn hit_test(&self, local: Point, size: Size) -> bool {
        self(local, size)
    }
}

/// Read-only view of an element handed to paint callbacks
///
/// Paint must not change layout; the only side effect available is
/// requesting another repaint.
pub struct ElementView<'a> {
    id: NodeId,
    element: &'a Element,
    invalidator: &'a Invalidator,
}

impl<'a> ElementView<'a> {
    pub(crate) fn new(id: NodeId, element: &'a Element, invalidator: &'a Invalidator) -> Self {
        Self {
            id,
            element,
            invalidator,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.element.name()
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.element.bounds()
    }

    pub fn size(&self) -> Size {
        self.element.bounds().size
    }

    /// Bounds in the element's own coordinates
    pub fn client_rect(&self) -> Rect {
        self.element.bounds().size.to_rect()
    }

    pub fn is_enabled(&self) -> bool {
        self.element.is_enabled()
    }

    pub fn property<T: 'static>(&self, key: Property<T>) -> Option<&'a T> {
        self.element.properties().get(key)
    }

    /// Schedule another repaint of this element
    pub fn invalidate(&self) {
        self.invalidator.invalidate(self.id);
    }

    pub fn invalidator(&self) -> &Invalidator {
        self.invalidator
    }
}
