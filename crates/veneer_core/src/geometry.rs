//! Geometry primitives shared by layout, paint and input routing
//!
//! All coordinates are logical pixels as `f32`. Rectangles are half-open:
//! a point on the right or bottom edge is outside.

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate the point by a delta
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Clamp negative dimensions to zero
    pub fn clamp_non_negative(self) -> Self {
        Self::new(self.width.max(0.0), self.height.max(0.0))
    }

    /// Convert to a Rect at the origin (0, 0)
    pub const fn to_rect(self) -> Rect {
        Rect {
            origin: Point::ZERO,
            size: self,
        }
    }
}

impl From<Size> for Rect {
    fn from(size: Size) -> Self {
        size.to_rect()
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Build a rectangle from its four edges. Inverted edges collapse to zero size.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check whether a point lies inside the rectangle (right/bottom exclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Intersection of two rectangles; empty (zero-size) when disjoint
    pub fn intersect(&self, other: &Rect) -> Rect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::new(left, top, 0.0, 0.0);
        }
        Rect::from_edges(left, top, right, bottom)
    }

    /// Translate the rectangle by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::from_origin_size(self.origin.offset(dx, dy), self.size)
    }

    /// Shrink by padding on each edge, never producing a negative size
    pub fn inset(&self, padding: Padding) -> Rect {
        Rect::new(
            self.x() + padding.left,
            self.y() + padding.top,
            (self.width() - padding.horizontal()).max(0.0),
            (self.height() - padding.vertical()).max(0.0),
        )
    }

    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, self.size)
    }

    pub fn with_size(&self, size: Size) -> Rect {
        Rect::from_origin_size(self.origin, size)
    }
}

/// Per-edge inner spacing of a container
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub const ZERO: Padding = Padding {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl From<f32> for Padding {
    fn from(value: f32) -> Self {
        Padding::uniform(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(29.9, 29.9)));
        assert!(!rect.contains(Point::new(30.0, 15.0)));
        assert!(!rect.contains(Point::new(15.0, 30.0)));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert!(a.intersect(&b).is_empty());

        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&c), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn test_inset_clamps_to_zero() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = rect.inset(Padding::uniform(8.0));
        assert_eq!(inner.origin, Point::new(8.0, 8.0));
        assert_eq!(inner.size, Size::ZERO);
    }
}
