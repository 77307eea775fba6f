//! RGBA color in linear `f32` components

/// RGBA color
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Build a color from straight (non-premultiplied) `0xAARRGGBB`
    pub fn from_argb(argb: u32) -> Self {
        let a = ((argb >> 24) & 0xFF) as f32 / 255.0;
        Self::from_hex(argb & 0x00FF_FFFF).with_alpha(a)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Multiply the alpha channel (used for opacity stacks)
    pub fn fade(mut self, opacity: f32) -> Self {
        self.a *= opacity.clamp(0.0, 1.0);
        self
    }

    /// Linear interpolation between two colors
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Pack as premultiplied `0xAARRGGBB`, the surface pixel format
    pub fn to_premultiplied_argb(&self) -> u32 {
        let a = self.a.clamp(0.0, 1.0);
        let channel = |c: f32| ((c.clamp(0.0, 1.0) * a * 255.0).round() as u32) & 0xFF;
        let alpha = ((a * 255.0).round() as u32) & 0xFF;
        (alpha << 24) | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}
