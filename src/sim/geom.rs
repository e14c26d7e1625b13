//! Rectangle geometry and overlap tests
//!
//! Everything on the surface collides as an axis-aligned box. Tilted leaves
//! are approximated by the box that bounds them at their current angle, which
//! can report a hit slightly early near the corners.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `pos` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap; see [`intersects`]
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.pos.min(other.pos);
        let max = (self.pos + self.size).max(other.pos + other.size);
        Rect {
            pos: min,
            size: max - min,
        }
    }
}

/// Open-interval overlap on both axes: shared edges do not intersect
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Axis-aligned bounds of a `size` rectangle rotated by `angle` about `center`
pub fn rotated_aabb(center: Vec2, size: Vec2, angle: f32) -> Rect {
    let (sin, cos) = angle.sin_cos();
    let (ca, sa) = (cos.abs(), sin.abs());
    let bounds = Vec2::new(ca * size.x + sa * size.y, sa * size.x + ca * size.y);
    Rect::from_center(center, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert!(a.intersects(&Rect::new(39.0, 19.0, 10.0, 10.0)));
        assert!(a.intersects(&Rect::new(10.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let actor = Rect::new(100.0, 100.0, 40.0, 20.0);
        // right edge == left edge
        assert!(!intersects(&actor, &Rect::new(140.0, 100.0, 40.0, 20.0)));
        // left edge == right edge
        assert!(!intersects(&actor, &Rect::new(60.0, 100.0, 40.0, 20.0)));
        // bottom edge == top edge
        assert!(!intersects(&actor, &Rect::new(100.0, 120.0, 40.0, 20.0)));
        // top edge == bottom edge
        assert!(!intersects(&actor, &Rect::new(100.0, 80.0, 40.0, 20.0)));
        // corner to corner
        assert!(!intersects(&actor, &Rect::new(140.0, 120.0, 5.0, 5.0)));
    }

    #[test]
    fn test_rotated_aabb_identity() {
        let r = rotated_aabb(Vec2::new(50.0, 50.0), Vec2::new(40.0, 20.0), 0.0);
        assert!((r.pos - Vec2::new(30.0, 40.0)).length() < 1e-4);
        assert!((r.size - Vec2::new(40.0, 20.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotated_aabb_quarter_turn_swaps_axes() {
        let r = rotated_aabb(Vec2::ZERO, Vec2::new(40.0, 20.0), FRAC_PI_2);
        assert!((r.size - Vec2::new(20.0, 40.0)).length() < 1e-3);
        assert!(r.center().length() < 1e-4);
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 30.0));
    }

    proptest! {
        #[test]
        fn prop_intersects_iff_both_intervals_overlap(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.5f32..200.0, ah in 0.5f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.5f32..200.0, bh in 0.5f32..200.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            let x_overlap = ax < bx + bw && bx < ax + aw;
            let y_overlap = ay < by + bh && by < ay + ah;
            prop_assert_eq!(intersects(&a, &b), x_overlap && y_overlap);
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_rotated_aabb_contains_corners(
            cx in -100.0f32..100.0, cy in -100.0f32..100.0,
            w in 1.0f32..80.0, h in 1.0f32..80.0,
            angle in -PI..PI,
        ) {
            let center = Vec2::new(cx, cy);
            let bounds = rotated_aabb(center, Vec2::new(w, h), angle);
            let rot = Vec2::from_angle(angle);
            for corner in [
                Vec2::new(-w, -h), Vec2::new(w, -h), Vec2::new(w, h), Vec2::new(-w, h),
            ] {
                let p = center + rot.rotate(corner * 0.5);
                prop_assert!(p.x >= bounds.left() - 1e-3 && p.x <= bounds.right() + 1e-3);
                prop_assert!(p.y >= bounds.top() - 1e-3 && p.y <= bounds.bottom() + 1e-3);
            }
        }
    }
}
