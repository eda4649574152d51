//! Attack and damage plumbing: hit descriptions, attack volumes and target
//! sensors. Volumes and sensors are boxes relative to their owner, mirrored
//! with its facing, and are queried against the collision world each tick.

use std::collections::BTreeSet;

use motion::{Aabb, BodyBounds, BodyId, CollisionWorld, LayerMask, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackSource {
    Julia,
    Juliett,
    Patrol,
    Guard,
    Mob,
    Laser,
    Particle,
}

/// One damage message from an attacker to a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub source: AttackSource,
    /// World x of the attacker; the target turns to face it.
    pub attacker_x: f32,
    pub damage: i32,
    /// `None` lets the target use its own default knockback.
    pub knockback: Option<Vec2>,
}

impl Hit {
    pub fn attacker_on_right_of(&self, x: f32) -> bool {
        self.attacker_x > x
    }
}

/// An attack box that can be switched on and off.
///
/// With `once_per_activation` a target is struck at most once between two
/// activations; otherwise it is struck on every overlapping tick.
#[derive(Clone, Debug, PartialEq)]
pub struct HitVolume {
    bounds: BodyBounds,
    active: bool,
    once_per_activation: bool,
    struck: BTreeSet<BodyId>,
}

impl HitVolume {
    pub fn new(bounds: BodyBounds, once_per_activation: bool) -> Self {
        Self {
            bounds,
            active: false,
            once_per_activation,
            struck: BTreeSet::new(),
        }
    }

    /// A volume that is always on and strikes every tick (enemy bodies).
    pub fn contact(bounds: BodyBounds) -> Self {
        Self {
            active: true,
            ..Self::new(bounds, false)
        }
    }

    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.struck.clear();
        }
        self.active = active;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn area(&self, position: Vec2, facing: f32) -> Option<Aabb> {
        self.active.then(|| self.bounds.world(position, facing))
    }

    /// Record a strike on `target`; false if it was already struck this activation.
    pub fn try_strike(&mut self, target: BodyId) -> bool {
        if !self.once_per_activation {
            return true;
        }
        self.struck.insert(target)
    }
}

/// Overlap sensor reporting whether any body of the target layers is inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetDetector {
    pub bounds: BodyBounds,
    pub targets: LayerMask,
}

impl TargetDetector {
    pub fn new(bounds: BodyBounds, targets: LayerMask) -> Self {
        Self { bounds, targets }
    }

    pub fn target_found(&self, world: &CollisionWorld, position: Vec2, facing: f32, owner: BodyId) -> bool {
        let area = self.bounds.world(position, facing);
        !world.overlap_box(&area, self.targets, Some(owner)).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use motion::Layer;

    use super::*;

    fn volume() -> HitVolume {
        HitVolume::new(
            BodyBounds {
                offset: Vec2::new(2.0, 0.0),
                half_extents: Vec2::new(1.0, 1.0),
            },
            true,
        )
    }

    #[test]
    fn inactive_volume_has_no_area() {
        let mut v = volume();
        assert_eq!(v.area(Vec2::zeros(), 1.0), None);
        v.set_active(true);
        let area = v.area(Vec2::zeros(), -1.0).unwrap();
        assert_eq!(area.center, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn strikes_once_per_activation() {
        let mut v = volume();
        v.set_active(true);
        assert!(v.try_strike(BodyId(3)));
        assert!(!v.try_strike(BodyId(3)));
        assert!(v.try_strike(BodyId(4)));

        // Staying active keeps the record.
        v.set_active(true);
        assert!(!v.try_strike(BodyId(3)));

        v.set_active(false);
        v.set_active(true);
        assert!(v.try_strike(BodyId(3)));
    }

    #[test]
    fn contact_volume_strikes_every_time() {
        let mut v = HitVolume::contact(BodyBounds::centered(Vec2::new(1.0, 1.0)));
        assert!(v.is_active());
        assert!(v.try_strike(BodyId(1)));
        assert!(v.try_strike(BodyId(1)));
    }

    #[test]
    fn detector_sees_targets_on_its_side_only() {
        let mut world = CollisionWorld::new();
        let owner = world.insert(Layer::Enemy, Aabb::new(Vec2::zeros(), Vec2::new(1.0, 1.0)));
        world.insert(Layer::Player, Aabb::new(Vec2::new(5.0, 0.0), Vec2::new(1.0, 1.0)));
        world.insert(Layer::Obstacle, Aabb::new(Vec2::new(-5.0, 0.0), Vec2::new(1.0, 1.0)));

        let detector = TargetDetector::new(
            BodyBounds {
                offset: Vec2::new(4.0, 0.0),
                half_extents: Vec2::new(4.0, 1.0),
            },
            Layer::Player.as_mask(),
        );
        assert!(detector.target_found(&world, Vec2::zeros(), 1.0, owner));
        assert!(!detector.target_found(&world, Vec2::zeros(), -1.0, owner));
    }
}
