//! Veneer Paint
//!
//! Turns an element tree into pixels. Each paintable root owns a
//! [`PaintPipeline`], which keeps one premultiplied ARGB [`Surface`] sized
//! to the root, draws into it through a [`PixelCanvas`] and presents the
//! finished buffer to the host window.
//!
//! # Example
//!
//! ```
//! use veneer_core::{Color, DrawContext, Rect};
//! use veneer_layout::prelude::*;
//! use veneer_paint::PaintPipeline;
//! use veneer_platform::HeadlessWindow;
//!
//! let mut tree = ElementTree::new();
//! let root = tree.insert(
//!     Element::new("window")
//!         .with_bounds(Rect::new(0.0, 0.0, 16.0, 16.0))
//!         .on_paint(|view, ctx| ctx.fill_rect(view.client_rect(), 0.0, Color::BLUE)),
//! );
//!
//! let mut host = HeadlessWindow::new(16, 16);
//! let outcome = PaintPipeline::new().paint(&tree, root, &mut host);
//! assert!(outcome.is_presented());
//! assert_eq!(host.pixel(8, 8), Some(0xFF00_00FF));
//! ```

pub mod canvas;
pub mod pipeline;
pub mod surface;

pub use canvas::PixelCanvas;
pub use pipeline::{PaintOutcome, PaintPipeline, PaintStats, SkipReason};
pub use surface::{Surface, SurfaceError, DEFAULT_MAX_SURFACE_DIMENSION};
