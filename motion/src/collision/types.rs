/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data types
exchanged between:
- world:        the collider store queried by rays and overlap boxes
- broad:        candidate pruning for a ray segment
- narrow_phase: parry ray casts against a single box
- probe:        ray origins derived from a body box
- controller:   the ray-sweep motion resolver
*/

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::layers::Layer;

/// Common math alias for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;

/// Stable identifier of a collider in a [`CollisionWorld`](super::world::CollisionWorld).
///
/// Ids are handed out in increasing order and never reused, so iterating by id
/// is iterating by insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// An axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Shrink (positive `amount`) or grow (negative) every side by `amount`.
    #[inline]
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            center: self.center,
            half_extents: self.half_extents - Vec2::repeat(amount),
        }
    }

    #[inline]
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            center: self.center + delta,
            half_extents: self.half_extents,
        }
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.half_extents.x > 0.0
            && self.half_extents.y > 0.0
            && self.center.iter().all(|c| c.is_finite())
    }
}

/// A body box described relative to its owner's position, authored facing right.
///
/// The x offset is mirrored when the owner faces left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyBounds {
    pub offset: Vec2,
    pub half_extents: Vec2,
}

impl BodyBounds {
    #[inline]
    pub fn centered(half_extents: Vec2) -> Self {
        Self {
            offset: Vec2::zeros(),
            half_extents,
        }
    }

    /// World box for an owner at `position` facing `facing` (+1 right, -1 left).
    #[inline]
    pub fn world(&self, position: Vec2, facing: f32) -> Aabb {
        Aabb::new(
            position + Vec2::new(self.offset.x * facing, self.offset.y),
            self.half_extents,
        )
    }
}

/// The nearest hit of a ray cast into the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit (world units, ray direction is unit length).
    pub distance: f32,
    /// World-space point of impact.
    pub point: Vec2,
    /// Surface normal at the hit. Zero when the ray started inside the collider.
    pub normal: Vec2,
    pub body: BodyId,
    pub layer: Layer,
}

/// Which frame a displacement is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    /// x is positive in the body's facing direction.
    Local,
    /// x is positive to the right.
    World,
}

/// Simulation clock handed to every tick (seconds).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub now: f32,
    pub dt: f32,
}

impl FrameTime {
    #[inline]
    pub fn new(now: f32, dt: f32) -> Self {
        Self { now, dt }
    }

    #[inline]
    pub fn advanced(self, dt: f32) -> Self {
        Self {
            now: self.now + dt,
            dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Aabb::new(Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(Vec2::new(-0.01, 0.0))));
    }

    #[test]
    fn bounds_mirror_offset_with_facing() {
        let bounds = BodyBounds {
            offset: Vec2::new(0.5, 1.0),
            half_extents: Vec2::new(1.0, 2.0),
        };
        let right = bounds.world(Vec2::new(10.0, 0.0), 1.0);
        let left = bounds.world(Vec2::new(10.0, 0.0), -1.0);
        assert!((right.center.x - 10.5).abs() < 1.0e-6);
        assert!((left.center.x - 9.5).abs() < 1.0e-6);
        assert!((left.center.y - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn inset_shrinks_every_side() {
        let a = Aabb::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0)).inset(0.1);
        assert!((a.min().x - 0.1).abs() < 1.0e-6);
        assert!((a.max().y - 3.9).abs() < 1.0e-6);
    }
}
