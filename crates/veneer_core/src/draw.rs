//! Draw Context - the opaque canvas handed to paint callbacks
//!
//! The core never depends on a particular rendering library. Paint callbacks
//! draw through `DrawContext`; the paint pipeline supplies an implementation
//! bound to the element's surface, and tests use [`RecordingContext`].
//!
//! # Example
//!
//! ```
//! use veneer_core::{Color, DrawContext, DrawContextExt, Rect, RecordingContext, Size};
//!
//! let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
//! ctx.with_translation(10.0, 20.0, |ctx| {
//!     ctx.fill_rect(Rect::new(0.0, 0.0, 50.0, 25.0), 0.0, Color::BLUE);
//! });
//! assert_eq!(ctx.commands().len(), 3);
//! ```

use smallvec::SmallVec;

use crate::color::Color;
use crate::geometry::{Point, Rect, Size};

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// 2D translation applied to subsequent drawing
///
/// Elements are axis-aligned, so the canvas only ever needs to move its
/// origin into each element's client area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { tx: 0.0, ty: 0.0 };

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self { tx, ty }
    }

    /// Compose: apply `self` first, then `other`
    pub fn then(&self, other: &Transform) -> Transform {
        Transform::translate(self.tx + other.tx, self.ty + other.ty)
    }

    pub fn apply(&self, point: Point) -> Point {
        point.offset(self.tx, self.ty)
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        rect.offset(self.tx, self.ty)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stroke and Text Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Stroke style configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Line width
    pub width: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

impl Stroke {
    pub fn new(width: f32) -> Self {
        Self { width }
    }
}

/// Text style configuration
///
/// Font resolution is an external concern; the family is passed through
/// untouched to whatever glyph renderer the host provides.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font family name
    pub family: String,
    /// Font size in pixels
    pub size: f32,
    /// Text color
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: String::new(),
            size: 14.0,
            color: Color::BLACK,
        }
    }
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DrawContext Trait
// ─────────────────────────────────────────────────────────────────────────────

/// The canvas abstraction exposed to element paint callbacks
///
/// Maintains transform, clip and opacity stacks. Clip rectangles are given in
/// the current (transformed) coordinate space and intersect with the clip
/// already in effect.
pub trait DrawContext {
    fn push_transform(&mut self, transform: Transform);

    fn pop_transform(&mut self);

    fn current_transform(&self) -> Transform;

    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);

    /// Multiply the current opacity by `opacity` until popped
    fn push_opacity(&mut self, opacity: f32);

    fn pop_opacity(&mut self);

    fn current_opacity(&self) -> f32;

    /// Fill the whole clip region with a color, replacing existing pixels
    fn clear(&mut self, color: Color);

    /// Fill a rectangle; `corner_radius` rounds all four corners
    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke, color: Color);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke, color: Color);

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle);

    /// Size of the drawable area in logical pixels
    fn viewport_size(&self) -> Size;
}

/// Scoped helpers layered over [`DrawContext`]
pub trait DrawContextExt: DrawContext {
    /// Run `f` with a translation pushed, popping it afterwards
    fn with_translation<F: FnOnce(&mut Self)>(&mut self, tx: f32, ty: f32, f: F) {
        self.push_transform(Transform::translate(tx, ty));
        f(self);
        self.pop_transform();
    }

    /// Run `f` with a clip pushed, popping it afterwards
    fn with_clip<F: FnOnce(&mut Self)>(&mut self, rect: Rect, f: F) {
        self.push_clip(rect);
        f(self);
        self.pop_clip();
    }

    /// Run `f` with an opacity multiplier pushed, popping it afterwards
    fn with_opacity<F: FnOnce(&mut Self)>(&mut self, opacity: f32, f: F) {
        self.push_opacity(opacity);
        f(self);
        self.pop_opacity();
    }
}

impl<T: DrawContext + ?Sized> DrawContextExt for T {}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// A draw command that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    PushTransform(Transform),
    PopTransform,
    PushClip(Rect),
    PopClip,
    PushOpacity(f32),
    PopOpacity,
    Clear(Color),
    FillRect {
        rect: Rect,
        corner_radius: f32,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
        color: Color,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
        color: Color,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
}

/// A draw context that records commands for later inspection or replay
#[derive(Debug)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    transform_stack: SmallVec<[Transform; 8]>,
    opacity_stack: SmallVec<[f32; 4]>,
    viewport: Size,
}

impl RecordingContext {
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            transform_stack: SmallVec::from_elem(Transform::IDENTITY, 1),
            opacity_stack: SmallVec::from_elem(1.0, 1),
            viewport,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Replay the recorded commands onto another context
    pub fn replay(&self, target: &mut dyn DrawContext) {
        for command in &self.commands {
            match command {
                DrawCommand::PushTransform(t) => target.push_transform(*t),
                DrawCommand::PopTransform => target.pop_transform(),
                DrawCommand::PushClip(rect) => target.push_clip(*rect),
                DrawCommand::PopClip => target.pop_clip(),
                DrawCommand::PushOpacity(o) => target.push_opacity(*o),
                DrawCommand::PopOpacity => target.pop_opacity(),
                DrawCommand::Clear(color) => target.clear(*color),
                DrawCommand::FillRect {
                    rect,
                    corner_radius,
                    color,
                } => target.fill_rect(*rect, *corner_radius, *color),
                DrawCommand::StrokeRect {
                    rect,
                    stroke,
                    color,
                } => target.stroke_rect(*rect, stroke, *color),
                DrawCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => target.fill_circle(*center, *radius, *color),
                DrawCommand::Line {
                    from,
                    to,
                    stroke,
                    color,
                } => target.draw_line(*from, *to, stroke, *color),
                DrawCommand::Text {
                    text,
                    origin,
                    style,
                } => target.draw_text(text, *origin, style),
            }
        }
    }
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl DrawContext for RecordingContext {
    fn push_transform(&mut self, transform: Transform) {
        self.commands.push(DrawCommand::PushTransform(transform));
        let composed = self.current_transform().then(&transform);
        self.transform_stack.push(composed);
    }

    fn pop_transform(&mut self) {
        self.commands.push(DrawCommand::PopTransform);
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        } else {
            tracing::trace!("RecordingContext: unbalanced pop_transform");
        }
    }

    fn current_transform(&self) -> Transform {
        self.transform_stack.last().copied().unwrap_or_default()
    }

    fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.commands.push(DrawCommand::PushOpacity(opacity));
        let current = self.current_opacity();
        self.opacity_stack.push(current * opacity);
    }

    fn pop_opacity(&mut self) {
        self.commands.push(DrawCommand::PopOpacity);
        if self.opacity_stack.len() > 1 {
            self.opacity_stack.pop();
        }
    }

    fn current_opacity(&self) -> f32 {
        self.opacity_stack.last().copied().unwrap_or(1.0)
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            corner_radius,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            stroke: stroke.clone(),
            color,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke: stroke.clone(),
            color,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            style: style.clone(),
        });
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }
}
