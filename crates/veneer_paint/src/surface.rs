//! Off-screen pixel surfaces
//!
//! A surface is a tightly packed `width * height` buffer of premultiplied
//! `0xAARRGGBB` pixels. Allocation is fallible: sizes are validated against
//! a maximum dimension and memory is reserved with `try_reserve_exact`, so
//! an oversized request turns into a [`SurfaceError`] instead of an abort.

use thiserror::Error;
use veneer_core::Size;

/// Default cap on either surface dimension
pub const DEFAULT_MAX_SURFACE_DIMENSION: u32 = 16_384;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface size {width}x{height} is empty")]
    Empty { width: u32, height: u32 },

    #[error("surface size {width}x{height} exceeds the maximum dimension {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("failed to allocate {bytes} bytes for a {width}x{height} surface")]
    Allocation { width: u32, height: u32, bytes: usize },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Surface {
    /// Allocate a transparent surface
    pub fn new(width: u32, height: u32, max_dimension: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty { width, height });
        }
        if width > max_dimension || height > max_dimension {
            return Err(SurfaceError::TooLarge {
                width,
                height,
                max: max_dimension,
            });
        }

        let allocation_error = || SurfaceError::Allocation {
            width,
            height,
            bytes: (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(std::mem::size_of::<u32>()),
        };
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(allocation_error)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| allocation_error())?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Allocate a surface covering a logical size, rounding up
    pub fn for_size(size: Size, max_dimension: u32) -> Result<Self, SurfaceError> {
        let (width, height) = pixel_dimensions(size);
        Self::new(width, height, max_dimension)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes in native endianness
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Whole-pixel dimensions covering a logical size
pub fn pixel_dimensions(size: Size) -> (u32, u32) {
    let to_px = |v: f32| if v.is_finite() && v > 0.0 { v.ceil().min(u32::MAX as f32) as u32 } else { 0 };
    (to_px(size.width), to_px(size.height))
}

// ─────────────────────────────────────────────────────────────────────────────
// Premultiplied pixel math
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
fn channel(px: u32, shift: u32) -> u32 {
    (px >> shift) & 0xFF
}

#[inline]
fn mul_255(a: u32, b: u32) -> u32 {
    (a * b + 127) / 255
}

/// Source-over composition of premultiplied pixels
#[inline]
pub fn blend_over(dst: u32, src: u32) -> u32 {
    let sa = channel(src, 24);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    [24, 16, 8, 0].iter().fold(0, |out, &shift| {
        let c = (channel(src, shift) + mul_255(channel(dst, shift), inv)).min(255);
        out | (c << shift)
    })
}

/// Scale every channel of a premultiplied pixel by `opacity`
#[inline]
pub fn scale(px: u32, opacity: f32) -> u32 {
    let factor = (opacity.clamp(0.0, 1.0) * 255.0).round() as u32;
    if factor == 255 {
        return px;
    }
    [24, 16, 8, 0].iter().fold(0, |out, &shift| {
        out | (mul_255(channel(px, shift), factor) << shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_limits() {
        assert_eq!(
            Surface::new(0, 10, 100),
            Err(SurfaceError::Empty { width: 0, height: 10 })
        );
        assert_eq!(
            Surface::new(101, 10, 100),
            Err(SurfaceError::TooLarge {
                width: 101,
                height: 10,
                max: 100
            })
        );

        let surface = Surface::new(4, 3, 100).unwrap();
        assert_eq!(surface.pixels().len(), 12);
        assert_eq!(surface.as_bytes().len(), 48);
        assert_eq!(surface.pixel(3, 2), Some(0));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_pixel_dimensions_round_up() {
        assert_eq!(pixel_dimensions(Size::new(10.2, 3.0)), (11, 3));
        assert_eq!(pixel_dimensions(Size::new(-1.0, f32::NAN)), (0, 0));
    }

    #[test]
    fn test_blend_over() {
        let opaque_red = 0xFFFF_0000;
        let black = 0xFF00_0000;
        assert_eq!(blend_over(black, opaque_red), opaque_red);
        assert_eq!(blend_over(opaque_red, 0), opaque_red);

        // Half-transparent white over black
        let out = blend_over(black, 0x8080_8080);
        assert_eq!(out >> 24, 0xFF);
        assert_eq!((out >> 16) & 0xFF, 0x80);
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(0xFFFF_FFFF, 1.0), 0xFFFF_FFFF);
        assert_eq!(scale(0xFFFF_FFFF, 0.0), 0);
        assert_eq!(scale(0xFFFF_FFFF, 0.5), 0x8080_8080);
    }
}
