#![forbid(unsafe_code)]

//! Geometric primitives for transition frames.
//!
//! Frames live in container-local coordinates with a signed origin: a screen
//! sliding in from the left legitimately starts at a negative `x`.

/// A rectangle in container-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (signed; may be off-screen).
    pub x: i32,
    /// Top edge (signed; may be off-screen).
    pub y: i32,
    /// Width in layout units.
    pub width: u32,
    /// Height in layout units.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Area in layout units.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The same rectangle translated by `(dx, dy)`.
    #[inline]
    pub const fn offset_by(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The rectangle's own coordinate space: same size, origin at zero.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Linear interpolation between two rectangles at `t` in [0, 1].
    pub fn lerp(&self, other: &Rect, t: f32) -> Rect {
        let t = t.clamp(0.0, 1.0);
        let lerp_i = |a: i32, b: i32| a + ((b - a) as f32 * t).round() as i32;
        let lerp_u = |a: u32, b: u32| (a as f32 + (b as f32 - a as f32) * t).round() as u32;
        Rect {
            x: lerp_i(self.x, other.x),
            y: lerp_i(self.y, other.y),
            width: lerp_u(self.width, other.width),
            height: lerp_u(self.height, other.height),
        }
    }
}

/// A translation applied to views animated alongside a transition.
///
/// Mirrored on the coordinator as the target transform of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub dx: f32,
    pub dy: f32,
}

impl Transform {
    /// The identity transform (no translation).
    pub const IDENTITY: Transform = Transform { dx: 0.0, dy: 0.0 };

    /// Create a translation transform.
    #[inline]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Whether this is the identity transform.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Transform};

    #[test]
    fn rect_edges_and_area() {
        let rect = Rect::new(-10, 5, 20, 4);
        assert_eq!(rect.right(), 10);
        assert_eq!(rect.bottom(), 9);
        assert_eq!(rect.area(), 80);
        assert!(!rect.is_empty());
        assert!(Rect::from_size(0, 10).is_empty());
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_offset_allows_negative_origin() {
        let rect = Rect::from_size(80, 24);
        assert_eq!(rect.offset_by(-80, 0), Rect::new(-80, 0, 80, 24));
    }

    #[test]
    fn rect_bounds_zeroes_origin() {
        assert_eq!(Rect::new(7, -3, 10, 10).bounds(), Rect::from_size(10, 10));
    }

    #[test]
    fn rect_lerp_endpoints_and_midpoint() {
        let a = Rect::new(0, 0, 100, 50);
        let b = Rect::new(-100, 0, 100, 50);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Rect::new(-50, 0, 100, 50));
    }

    #[test]
    fn rect_lerp_clamps_t() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 0, 10, 10);
        assert_eq!(a.lerp(&b, -1.0), a);
        assert_eq!(a.lerp(&b, 2.0), b);
    }

    #[test]
    fn transform_identity() {
        assert!(Transform::IDENTITY.is_identity());
        assert!(!Transform::translation(1.0, 0.0).is_identity());
    }
}
