//! Per-root paint pipeline
//!
//! One [`PaintPipeline`] serves one paintable root. A frame:
//!
//! 1. Ensures the surface matches the root's size, reallocating on mismatch
//! 2. Binds a [`PixelCanvas`] to the surface
//! 3. Walks visible elements bottom-most first; each one is translated to
//!    its origin, clipped to its bounds and handed to its paint callback
//! 4. Drops the canvas (the pixels are already written)
//! 5. Presents the whole buffer to the host in one call
//!
//! Nothing in here propagates an error. A frame that cannot be produced is
//! reported as [`PaintOutcome::Skipped`] and retried on the next
//! invalidation.

use veneer_core::{Color, DrawContext, Point, Transform};
use veneer_layout::{ElementTree, NodeId};
use veneer_platform::{HostWindow, PresentFrame};

use crate::canvas::PixelCanvas;
use crate::surface::{pixel_dimensions, Surface, SurfaceError, DEFAULT_MAX_SURFACE_DIMENSION};

/// Counters for one presented frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Visible elements visited
    pub elements_painted: usize,
    /// Subtrees drawn through their own opacity layer
    pub layers_composited: usize,
    pub surface_reallocated: bool,
}

/// Why a frame was not presented
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The root is hidden or no longer in the tree
    Hidden,
    Surface(SurfaceError),
    /// The host rejected the frame
    Present(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PaintOutcome {
    Presented(PaintStats),
    Skipped(SkipReason),
}

impl PaintOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, PaintOutcome::Presented(_))
    }

    pub fn stats(&self) -> Option<&PaintStats> {
        match self {
            PaintOutcome::Presented(stats) => Some(stats),
            PaintOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct PaintPipeline {
    surface: Option<Surface>,
    max_surface_dimension: u32,
    clear_color: Color,
    frames_presented: u64,
}

impl Default for PaintPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintPipeline {
    pub fn new() -> Self {
        Self {
            surface: None,
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
            clear_color: Color::WHITE,
            frames_presented: 0,
        }
    }

    pub fn with_max_surface_dimension(mut self, max: u32) -> Self {
        self.max_surface_dimension = max;
        self
    }

    /// Color the surface is cleared to before the root paints
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Release the surface; the next paint allocates a fresh one
    pub fn dispose(&mut self) {
        if let Some(surface) = self.surface.take() {
            tracing::debug!(width = surface.width(), height = surface.height(), "surface disposed");
        }
    }

    /// Paint `root` and present it to `host`
    pub fn paint<H>(&mut self, tree: &ElementTree, root: NodeId, host: &mut H) -> PaintOutcome
    where
        H: HostWindow + ?Sized,
    {
        let Some(element) = tree.get(root).filter(|e| e.is_visible()) else {
            return PaintOutcome::Skipped(SkipReason::Hidden);
        };

        let (width, height) = pixel_dimensions(element.bounds().size);
        let surface_reallocated = match self.ensure_surface(width, height) {
            Ok(reallocated) => reallocated,
            Err(err) => {
                match err {
                    SurfaceError::Empty { .. } => tracing::debug!(%err, "frame skipped"),
                    _ => tracing::warn!(%err, "frame skipped"),
                }
                return PaintOutcome::Skipped(SkipReason::Surface(err));
            }
        };
        let Some(surface) = self.surface.as_mut() else {
            return PaintOutcome::Skipped(SkipReason::Hidden);
        };

        // Invalidation raised while painting belongs to the next frame
        tree.invalidator().clear();

        let mut stats = PaintStats {
            surface_reallocated,
            ..Default::default()
        };
        {
            let mut canvas = PixelCanvas::new(surface);
            canvas.clear(self.clear_color);
            // The root draws at its client origin
            let origin = element.bounds().origin;
            canvas.push_transform(Transform::translate(-origin.x, -origin.y));
            paint_element(tree, root, &mut canvas, self.max_surface_dimension, &mut stats);
            canvas.pop_transform();
        }

        let frame = PresentFrame {
            pixels: surface.pixels(),
            width: surface.width(),
            height: surface.height(),
        };
        if let Err(err) = host.present(frame) {
            tracing::warn!(%err, "present failed");
            return PaintOutcome::Skipped(SkipReason::Present(err.to_string()));
        }

        self.frames_presented += 1;
        tracing::trace!(?stats, "frame presented");
        PaintOutcome::Presented(stats)
    }

    /// Returns whether a new surface was allocated
    fn ensure_surface(&mut self, width: u32, height: u32) -> Result<bool, SurfaceError> {
        if self.surface.as_ref().is_some_and(|s| s.matches(width, height)) {
            return Ok(false);
        }
        // Drop the old buffer before asking for the new one
        self.surface = None;
        let surface = Surface::new(width, height, self.max_surface_dimension)?;
        tracing::debug!(width, height, "surface allocated");
        self.surface = Some(surface);
        Ok(true)
    }
}

fn paint_element(
    tree: &ElementTree,
    id: NodeId,
    canvas: &mut PixelCanvas<'_>,
    max_dimension: u32,
    stats: &mut PaintStats,
) {
    let Some(element) = tree.get(id).filter(|e| e.is_visible()) else {
        return;
    };
    let bounds = element.bounds();

    canvas.push_transform(Transform::translate(bounds.x(), bounds.y()));
    canvas.push_clip(bounds.size.to_rect());

    match element.layer_opacity() {
        Some(opacity) => match Surface::for_size(bounds.size, max_dimension) {
            Ok(mut layer) => {
                {
                    let mut layer_canvas = PixelCanvas::new(&mut layer);
                    paint_contents(tree, id, &mut layer_canvas, max_dimension, stats);
                }
                canvas.draw_layer(&layer, Point::ZERO, opacity);
                stats.layers_composited += 1;
            }
            Err(err) => {
                // Fall back to drawing inline with the opacity applied per primitive
                tracing::debug!(?id, %err, "layer unavailable, painting inline");
                canvas.push_opacity(opacity);
                paint_contents(tree, id, canvas, max_dimension, stats);
                canvas.pop_opacity();
            }
        },
        None => paint_contents(tree, id, canvas, max_dimension, stats),
    }

    canvas.pop_clip();
    canvas.pop_transform();
}

fn paint_contents(
    tree: &ElementTree,
    id: NodeId,
    canvas: &mut PixelCanvas<'_>,
    max_dimension: u32,
    stats: &mut PaintStats,
) {
    stats.elements_painted += 1;

    if let Some(view) = tree.view(id) {
        if let Some(painter) = tree.node(id).painter() {
            painter.paint(&view, canvas);
        }
    }

    for child in tree.children_by_z(id) {
        paint_element(tree, child, canvas, max_dimension, stats);
    }
}
