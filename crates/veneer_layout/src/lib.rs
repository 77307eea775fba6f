//! Veneer Layout
//!
//! The element tree and everything that walks it without drawing:
//! dock/anchor layout, paint invalidation, keyboard focus, hit-testing and
//! input routing.
//!
//! # Example
//!
//! ```rust
//! use veneer_layout::prelude::*;
//! use veneer_core::Rect;
//!
//! let mut tree = ElementTree::new();
//! let window = tree.insert(Element::new("window").with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)));
//! let top = tree
//!     .insert_child(window, Element::new("toolbar").with_bounds(Rect::new(0.0, 0.0, 0.0, 20.0)).with_dock(Dock::Top))
//!     .unwrap();
//! let bottom = tree
//!     .insert_child(window, Element::new("status").with_bounds(Rect::new(0.0, 0.0, 0.0, 15.0)).with_dock(Dock::Bottom))
//!     .unwrap();
//! let body = tree
//!     .insert_child(window, Element::new("body").with_dock(Dock::Fill))
//!     .unwrap();
//!
//! assert_eq!(tree.bounds(top), Rect::new(0.0, 0.0, 100.0, 20.0));
//! assert_eq!(tree.bounds(bottom), Rect::new(0.0, 85.0, 100.0, 15.0));
//! assert_eq!(tree.bounds(body), Rect::new(0.0, 20.0, 100.0, 65.0));
//! ```

pub mod capability;
pub mod element;
pub mod event_handler;
pub mod event_router;
pub mod focus;
pub mod invalidation;
pub mod layout;
pub mod properties;
pub mod tree;

// Core types
pub use capability::{ElementView, HitTestable, Layoutable, Paintable};
pub use element::{Element, ElementKind};
pub use event_handler::{
    DeferredEdits, EventCallback, EventContext, EventHandlers, EventType, RequestQueue, RouterRequest, TreeEdit,
};
pub use event_router::{hit_test, Dispatched, EventRouter, HitTestResult};
pub use focus::FocusContext;
pub use invalidation::{DirtyTracker, Invalidator};
pub use layout::{Anchor, AnchorInfo, ArrangeGuard, Dock, DockFold, LayoutMode, LayoutState};
pub use properties::{Property, PropertyStore};
pub use tree::{ElementTree, NodeId, TreeError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::capability::{ElementView, HitTestable, Layoutable, Paintable};
    pub use crate::element::{Element, ElementKind};
    pub use crate::event_handler::{DeferredEdits, EventContext, EventHandlers, EventType};
    pub use crate::event_router::{hit_test, EventRouter, HitTestResult};
    pub use crate::focus::FocusContext;
    pub use crate::invalidation::Invalidator;
    pub use crate::layout::{Anchor, Dock, LayoutMode};
    pub use crate::properties::Property;
    pub use crate::tree::{ElementTree, NodeId, TreeError};
}
