//! Veneer Core
//!
//! Foundational types for the Veneer element framework:
//!
//! - **Geometry**: `Point`, `Size`, `Rect`, `Padding`
//! - **Color**: straight RGBA with premultiplied packing for surfaces
//! - **Draw Context**: the opaque canvas handed to paint callbacks
//! - **Theme boundary**: `ColorProvider`, queried but never interpreted

pub mod color;
pub mod draw;
pub mod geometry;
pub mod theme;

pub use color::Color;
pub use draw::{
    DrawCommand, DrawContext, DrawContextExt, RecordingContext, Stroke, TextStyle, Transform,
};
pub use geometry::{Padding, Point, Rect, Size};
pub use theme::{ColorProvider, ColorRole};
