//! A straight horizontal beam that grows until it meets geometry.
//!
//! The beam is a segment from `tail` to `tip`. Growing casts a single ray from
//! the tip and clips the growth against the nearest hit with the same skin rule
//! as the motion resolver; shrinking pulls the tail forward.

use crate::collision::types::{Aabb, RayHit, Vec2};
use crate::collision::world::CollisionWorld;
use crate::layers::LayerMask;

#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    tail: Vec2,
    /// +1 towards the right, -1 towards the left.
    direction: f32,
    length: f32,
    half_thickness: f32,
    collision_mask: LayerMask,
    skin_width: f32,
}

impl Beam {
    pub fn new(tail: Vec2, heading_right: bool, half_thickness: f32, collision_mask: LayerMask, skin_width: f32) -> Self {
        Self {
            tail,
            direction: if heading_right { 1.0 } else { -1.0 },
            length: 0.0,
            half_thickness,
            collision_mask,
            skin_width,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn tail(&self) -> Vec2 {
        self.tail
    }

    #[inline]
    pub fn tip(&self) -> Vec2 {
        self.tail + Vec2::new(self.direction * self.length, 0.0)
    }

    /// Region the beam currently covers, or `None` once it has no length left.
    pub fn area(&self) -> Option<Aabb> {
        if self.length <= 0.0 {
            return None;
        }
        let tip = self.tip();
        Some(Aabb::from_min_max(
            Vec2::new(self.tail.x.min(tip.x), self.tail.y - self.half_thickness),
            Vec2::new(self.tail.x.max(tip.x), self.tail.y + self.half_thickness),
        ))
    }

    /// Extend by up to `amount`, stopping a skin short of the nearest obstacle.
    ///
    /// Returns the obstacle hit by this step, if any. Non-positive amounts change
    /// the length directly without probing.
    pub fn grow(&mut self, world: &CollisionWorld, amount: f32) -> Option<RayHit> {
        if amount <= 0.0 {
            self.length += amount;
            return None;
        }

        let ray_length = amount + self.skin_width;
        let hit = world.raycast(
            self.tip(),
            Vec2::new(self.direction, 0.0),
            ray_length,
            self.collision_mask,
            None,
        );

        let growth = match hit {
            Some(hit) if hit.distance <= self.skin_width => 0.0,
            Some(hit) => hit.distance - self.skin_width,
            None => amount,
        };
        self.length += growth;
        hit
    }

    /// Retract the tail by `amount`.
    pub fn shrink(&mut self, amount: f32) {
        self.length -= amount;
        self.tail.x += self.direction * amount;
    }

    /// Fully retracted.
    #[inline]
    pub fn is_spent(&self) -> bool {
        self.length <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SKIN_WIDTH;
    use crate::layers::{Layer, collidable_mask};

    #[test]
    fn grows_freely_then_stops_at_wall() {
        let mut world = CollisionWorld::new();
        world.insert(Layer::Obstacle, Aabb::new(Vec2::new(10.5, 0.0), Vec2::new(0.5, 2.0)));
        let mut beam = Beam::new(Vec2::zeros(), true, 0.1, collidable_mask(), SKIN_WIDTH);

        assert!(beam.grow(&world, 4.0).is_none());
        assert!((beam.length() - 4.0).abs() < 1.0e-6);

        let hit = beam.grow(&world, 20.0).expect("wall is in range");
        assert_eq!(hit.layer, Layer::Obstacle);
        assert!((beam.tip().x - (10.0 - SKIN_WIDTH)).abs() < 1.0e-4);

        // Touching: no more growth.
        beam.grow(&world, 1.0);
        assert!((beam.tip().x - (10.0 - SKIN_WIDTH)).abs() < 1.0e-4);
    }

    #[test]
    fn left_facing_beam_grows_left() {
        let world = CollisionWorld::new();
        let mut beam = Beam::new(Vec2::new(5.0, 1.0), false, 0.1, collidable_mask(), SKIN_WIDTH);
        beam.grow(&world, 2.0);
        assert!((beam.tip().x - 3.0).abs() < 1.0e-6);
        let area = beam.area().unwrap();
        assert!((area.min().x - 3.0).abs() < 1.0e-6);
        assert!((area.max().x - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn shrinking_moves_the_tail_forward() {
        let world = CollisionWorld::new();
        let mut beam = Beam::new(Vec2::zeros(), true, 0.1, collidable_mask(), SKIN_WIDTH);
        beam.grow(&world, 3.0);
        beam.shrink(1.0);
        assert!((beam.tail().x - 1.0).abs() < 1.0e-6);
        assert!((beam.tip().x - 3.0).abs() < 1.0e-6);

        beam.shrink(2.5);
        assert!(beam.is_spent());
        assert!(beam.area().is_none());
    }
}
