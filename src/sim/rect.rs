//! Axis-aligned rectangle geometry
//!
//! Every entity is a box: `pos` is the top-left corner, `size` the extent.
//! Overlap tests are strict, so boxes that only share an edge do not touch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// A square of side `side` with its top-left at `pos`
    pub fn square(pos: Vec2, side: f32) -> Self {
        Self::new(pos, Vec2::splat(side))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.pos - Vec2::new(dx, dy),
            self.size + Vec2::new(dx, dy) * 2.0,
        )
    }

    /// Top-left position that keeps a box of `size` fully inside `self`
    pub fn clamp_inside(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let max = (self.pos + self.size - size).max(self.pos);
        pos.clamp(self.pos, max)
    }

    /// True when no part of `other` lies inside `self`
    pub fn fully_outside(&self, other: &Rect) -> bool {
        !self.intersects(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::square(Vec2::new(0.0, 0.0), 10.0);
        let b = Rect::square(Vec2::new(5.0, 5.0), 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::square(Vec2::new(0.0, 0.0), 10.0);
        let b = Rect::square(Vec2::new(10.0, 0.0), 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_identical_bounds_intersect() {
        let a = Rect::square(Vec2::new(40.0, 40.0), 8.0);
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_inflate_keeps_center() {
        let r = Rect::square(Vec2::new(100.0, 100.0), 30.0);
        let z = r.inflate(30.0, 30.0);
        assert_eq!(z.center(), r.center());
        assert_eq!(z.size, Vec2::splat(90.0));
    }

    #[test]
    fn test_clamp_inside() {
        let area = Rect::new(Vec2::ZERO, Vec2::new(800.0, 600.0));
        let size = Vec2::splat(30.0);
        assert_eq!(
            area.clamp_inside(Vec2::new(-5.0, 590.0), size),
            Vec2::new(0.0, 570.0)
        );
        assert_eq!(
            area.clamp_inside(Vec2::new(100.0, 100.0), size),
            Vec2::new(100.0, 100.0)
        );
    }
}
