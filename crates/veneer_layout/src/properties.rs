//! Sparse per-element property storage
//!
//! Most elements never set a dock, an anchor or a layer opacity, so these
//! live in a small map keyed by [`Property`] instead of as fixed fields.
//! Values are stored type-erased and downcast on read; the key carries the
//! value type so a mismatched read is impossible through the typed API.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use veneer_core::{Padding, Rect};

use crate::layout::{Anchor, AnchorInfo, Dock};

/// Typed key into a [`PropertyStore`]
///
/// Ids below 100 are reserved for the built-in keys in this module.
pub struct Property<T: 'static> {
    id: u32,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Property<T> {
    pub const fn new(id: u32, name: &'static str) -> Self {
        Self {
            id,
            name,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Property<T> {}

impl<T: 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({}: {})", self.id, self.name)
    }
}

/// Dock edge; overrides any anchor when not [`Dock::None`]
pub const DOCK: Property<Dock> = Property::new(1, "Dock");
/// Anchored edges, `TOP | LEFT` when unset
pub const ANCHOR: Property<Anchor> = Property::new(2, "Anchor");
/// Edge offsets captured when the anchor, bounds or parent last changed
pub const ANCHOR_INFO: Property<AnchorInfo> = Property::new(3, "AnchorInfo");
/// Bounds last set by user code; docks take their extent from here
pub const SPECIFIED_BOUNDS: Property<Rect> = Property::new(4, "SpecifiedBounds");
/// Inset applied to the client rect before children are laid out
pub const PADDING: Property<Padding> = Property::new(5, "Padding");
/// Paint this subtree into its own layer and composite it at this opacity
pub const LAYER_OPACITY: Property<f32> = Property::new(6, "LayerOpacity");
/// Pass unhandled wheel events on to the parent
pub const BUBBLE_WHEEL: Property<bool> = Property::new(7, "BubbleWheel");

/// Type-erased property map owned by one element
#[derive(Default)]
pub struct PropertyStore {
    values: FxHashMap<u32, Box<dyn Any>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: 'static>(&self, key: Property<T>) -> Option<&T> {
        self.values.get(&key.id)?.downcast_ref::<T>()
    }

    pub fn get_or_default<T: Clone + Default + 'static>(&self, key: Property<T>) -> T {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Store a value, returning the previous one
    pub fn set<T: 'static>(&mut self, key: Property<T>, value: T) -> Option<T> {
        self.values
            .insert(key.id, Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    pub fn remove<T: 'static>(&mut self, key: Property<T>) -> Option<T> {
        self.values
            .remove(&key.id)
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    pub fn contains<T: 'static>(&self, key: Property<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("len", &self.values.len())
            .finish()
    }
}
