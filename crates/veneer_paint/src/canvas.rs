//! Pixel canvas - a [`DrawContext`] that rasterizes straight into a surface
//!
//! Drawing writes the backing pixels immediately, so there is nothing to
//! flush: dropping the canvas releases the surface borrow and the frame is
//! ready to present. Coverage is sampled at pixel centres without
//! antialiasing.

use std::ops::Range;

use smallvec::SmallVec;
use veneer_core::{Color, DrawContext, Point, Rect, Size, Stroke, TextStyle, Transform};

use crate::surface::{blend_over, scale, Surface};

/// Canvas bound to one surface for the duration of a paint
pub struct PixelCanvas<'a> {
    surface: &'a mut Surface,
    transform_stack: SmallVec<[Transform; 8]>,
    /// Device-space clip rectangles, each already intersected with its parent
    clip_stack: SmallVec<[Rect; 8]>,
    opacity_stack: SmallVec<[f32; 4]>,
}

impl<'a> PixelCanvas<'a> {
    pub fn new(surface: &'a mut Surface) -> Self {
        let full = surface.size().to_rect();
        Self {
            surface,
            transform_stack: SmallVec::from_elem(Transform::IDENTITY, 1),
            clip_stack: SmallVec::from_elem(full, 1),
            opacity_stack: SmallVec::from_elem(1.0, 1),
        }
    }

    /// Current clip in device pixels
    pub fn current_clip(&self) -> Rect {
        self.clip_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.surface.size().to_rect())
    }

    /// Composite a finished layer with its top-left at `origin` (current space)
    pub fn draw_layer(&mut self, layer: &Surface, origin: Point, opacity: f32) {
        let opacity = opacity * self.current_opacity();
        let at = self.current_transform().apply(origin);
        let target = Rect::from_origin_size(at, layer.size()).intersect(&self.current_clip());
        let (xs, ys) = self.spans(target);

        let width = self.surface.width() as usize;
        for y in ys {
            for x in xs.clone() {
                let lx = (x as f32 - at.x).floor();
                let ly = (y as f32 - at.y).floor();
                if lx < 0.0 || ly < 0.0 {
                    continue;
                }
                let Some(src) = layer.pixel(lx as u32, ly as u32) else {
                    continue;
                };
                let idx = y as usize * width + x as usize;
                let pixels = self.surface.pixels_mut();
                pixels[idx] = blend_over(pixels[idx], scale(src, opacity));
            }
        }
    }

    /// Pixel rows and columns whose centres fall inside a device rect
    fn spans(&self, rect: Rect) -> (Range<u32>, Range<u32>) {
        let span = |lo: f32, hi: f32, limit: u32| {
            let start = (lo - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            start..end.max(start)
        };
        (
            span(rect.left(), rect.right(), self.surface.width()),
            span(rect.top(), rect.bottom(), self.surface.height()),
        )
    }

    /// Blend `color` into every covered pixel of `rect` (current space)
    /// that `covers` accepts, given the pixel centre in device space
    fn fill_where<F>(&mut self, rect: Rect, color: Color, covers: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let src = color.fade(self.current_opacity()).to_premultiplied_argb();
        if src >> 24 == 0 {
            return;
        }
        let device = self.current_transform().apply_rect(rect).intersect(&self.current_clip());
        let (xs, ys) = self.spans(device);

        let width = self.surface.width() as usize;
        let pixels = self.surface.pixels_mut();
        for y in ys {
            let cy = y as f32 + 0.5;
            for x in xs.clone() {
                if covers(x as f32 + 0.5, cy) {
                    let idx = y as usize * width + x as usize;
                    pixels[idx] = blend_over(pixels[idx], src);
                }
            }
        }
    }
}

impl DrawContext for PixelCanvas<'_> {
    fn push_transform(&mut self, transform: Transform) {
        let composed = self.current_transform().then(&transform);
        self.transform_stack.push(composed);
    }

    fn pop_transform(&mut self) {
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        } else {
            tracing::trace!("PixelCanvas: unbalanced pop_transform");
        }
    }

    fn current_transform(&self) -> Transform {
        self.transform_stack.last().copied().unwrap_or_default()
    }

    fn push_clip(&mut self, rect: Rect) {
        let device = self.current_transform().apply_rect(rect);
        let clip = device.intersect(&self.current_clip());
        self.clip_stack.push(clip);
    }

    fn pop_clip(&mut self) {
        if self.clip_stack.len() > 1 {
            self.clip_stack.pop();
        } else {
            tracing::trace!("PixelCanvas: unbalanced pop_clip");
        }
    }

    fn push_opacity(&mut self, opacity: f32) {
        let current = self.current_opacity();
        self.opacity_stack.push(current * opacity.clamp(0.0, 1.0));
    }

    fn pop_opacity(&mut self) {
        if self.opacity_stack.len() > 1 {
            self.opacity_stack.pop();
        }
    }

    fn current_opacity(&self) -> f32 {
        self.opacity_stack.last().copied().unwrap_or(1.0)
    }

    fn clear(&mut self, color: Color) {
        let argb = color.fade(self.current_opacity()).to_premultiplied_argb();
        let (xs, ys) = self.spans(self.current_clip());
        let width = self.surface.width() as usize;
        let pixels = self.surface.pixels_mut();
        for y in ys {
            let row = y as usize * width;
            pixels[row + xs.start as usize..row + xs.end as usize].fill(argb);
        }
    }

    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, color: Color) {
        let radius = corner_radius.min(rect.width() / 2.0).min(rect.height() / 2.0);
        if radius <= 0.0 {
            self.fill_where(rect, color, |_, _| true);
            return;
        }

        let device = self.current_transform().apply_rect(rect);
        let inner = Rect::from_edges(
            device.left() + radius,
            device.top() + radius,
            device.right() - radius,
            device.bottom() - radius,
        );
        self.fill_where(rect, color, |x, y| {
            let dx = (inner.left() - x).max(x - inner.right()).max(0.0);
            let dy = (inner.top() - y).max(y - inner.bottom()).max(0.0);
            dx * dx + dy * dy <= radius * radius
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke, color: Color) {
        let w = stroke.width.min(rect.width() / 2.0).min(rect.height() / 2.0);
        if w <= 0.0 {
            return;
        }
        // Inside stroke: four bands that never overlap
        self.fill_rect(Rect::new(rect.x(), rect.y(), rect.width(), w), 0.0, color);
        self.fill_rect(Rect::new(rect.x(), rect.bottom() - w, rect.width(), w), 0.0, color);
        let side = rect.height() - 2.0 * w;
        self.fill_rect(Rect::new(rect.x(), rect.y() + w, w, side), 0.0, color);
        self.fill_rect(Rect::new(rect.right() - w, rect.y() + w, w, side), 0.0, color);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let bounds = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        let c = self.current_transform().apply(center);
        self.fill_where(bounds, color, |x, y| {
            let dx = x - c.x;
            let dy = y - c.y;
            dx * dx + dy * dy <= radius * radius
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke, color: Color) {
        let half = stroke.width.max(1.0) / 2.0;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

        if dx == 0.0 || dy == 0.0 {
            let rect = Rect::from_edges(
                from.x.min(to.x) - if dx == 0.0 { half } else { 0.0 },
                from.y.min(to.y) - if dy == 0.0 { half } else { 0.0 },
                from.x.max(to.x) + if dx == 0.0 { half } else { 0.0 },
                from.y.max(to.y) + if dy == 0.0 { half } else { 0.0 },
            );
            self.fill_where(rect, color, |_, _| true);
            return;
        }

        // Stamp a stroke-wide square at each step
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = Point::new(from.x + dx * t, from.y + dy * t);
            let square = Rect::new(p.x - half, p.y - half, half * 2.0, half * 2.0);
            self.fill_where(square, color, |_, _| true);
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        // Glyph rasterization belongs to the host's text stack
        tracing::trace!(len = text.len(), ?origin, size = style.size, "PixelCanvas: text skipped");
    }

    fn viewport_size(&self) -> Size {
        self.surface.size()
    }
}
