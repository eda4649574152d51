use std::collections::BTreeSet;

use motion::{Aabb, Beam, BodyId, CollisionWorld, ControllerSettings, Vec2, collidable_mask};

use super::ProjectileId;
use crate::{
    combat::{AttackSource, Hit},
    tuning::LaserTuning,
};

/// A beam that grows from the muzzle until its budget is used up, and
/// retracts from the tail once stopped.
///
/// Growth is budgeted by the requested amount, not by what the geometry let
/// through, so a beam pressed against a wall stays short but still runs out.
#[derive(Clone, Debug)]
pub struct Laser {
    id: ProjectileId,
    beam: Beam,
    speed: f32,
    maximum_length: Option<f32>,
    total_grown: f32,
    stopped: bool,
    damaging: bool,
    struck: BTreeSet<BodyId>,
}

impl Laser {
    pub fn new(
        id: ProjectileId,
        origin: Vec2,
        heading_right: bool,
        tuning: &LaserTuning,
        reference_speed: f32,
        settings: &ControllerSettings,
    ) -> Self {
        Self {
            id,
            beam: Beam::new(origin, heading_right, tuning.half_thickness, collidable_mask(), settings.skin_width),
            speed: reference_speed * tuning.speed_relative_to_reference,
            maximum_length: tuning.maximum_length,
            total_grown: 0.0,
            stopped: false,
            damaging: tuning.damaging,
            struck: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_damaging(&self) -> bool {
        self.damaging
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn tick(&mut self, world: &CollisionWorld, dt: f32) {
        let step = self.speed * dt;
        // An unbounded line only grows until stopped; a bounded beam keeps
        // spending its budget while it retracts.
        let may_grow = match self.maximum_length {
            Some(max) => self.total_grown < max,
            None => !self.stopped,
        };
        if may_grow {
            self.total_grown += step;
            self.beam.grow(world, step);
        }
        if self.stopped {
            self.beam.shrink(step);
        }
    }

    /// Retracted completely after being stopped.
    pub fn is_spent(&self) -> bool {
        self.stopped && self.beam.is_spent()
    }

    /// Region that damages, `None` for the aiming line.
    pub fn area(&self) -> Option<Aabb> {
        if !self.damaging {
            return None;
        }
        self.beam.area()
    }

    /// Each target is burnt at most once per beam.
    pub fn on_attack(&mut self, target: BodyId) -> Option<Hit> {
        if !self.damaging || !self.struck.insert(target) {
            return None;
        }
        Some(Hit {
            source: AttackSource::Laser,
            attacker_x: self.beam.tail().x,
            damage: 1,
            knockback: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use motion::{Layer, SKIN_WIDTH};

    use super::*;

    const DT: f32 = 0.1;

    fn laser(tuning: &LaserTuning) -> Laser {
        Laser::new(
            ProjectileId(0),
            Vec2::zeros(),
            true,
            tuning,
            25.0,
            &ControllerSettings::default(),
        )
    }

    #[test]
    fn grows_up_to_maximum_length() {
        let world = CollisionWorld::new();
        let mut laser = laser(&LaserTuning::default());
        laser.tick(&world, DT);
        assert!((laser.beam().length() - 12.5).abs() < 1e-4);
        for _ in 0..20 {
            laser.tick(&world, DT);
        }
        // Budget is spent after 8 steps of 12.5.
        assert!((laser.beam().length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn wall_clips_growth() {
        let mut world = CollisionWorld::new();
        world.insert(Layer::Obstacle, Aabb::new(Vec2::new(21.0, 0.0), Vec2::new(1.0, 5.0)));
        let mut laser = laser(&LaserTuning::default());
        for _ in 0..5 {
            laser.tick(&world, DT);
        }
        assert!((laser.beam().length() - (20.0 - SKIN_WIDTH)).abs() < 1e-3);
    }

    #[test]
    fn stopped_beam_retracts_and_is_spent() {
        let world = CollisionWorld::new();
        let mut laser = laser(&LaserTuning::default());
        for _ in 0..8 {
            laser.tick(&world, DT);
        }
        assert!(!laser.is_spent());
        laser.stop();
        for _ in 0..8 {
            laser.tick(&world, DT);
        }
        assert!(laser.is_spent());
        assert_eq!(laser.area(), None);
    }

    #[test]
    fn burns_each_target_once() {
        let world = CollisionWorld::new();
        let mut laser = laser(&LaserTuning::default());
        laser.tick(&world, DT);
        let hit = laser.on_attack(BodyId(7)).unwrap();
        assert_eq!(hit.damage, 1);
        assert_eq!(hit.knockback, None);
        assert_eq!(laser.on_attack(BodyId(7)), None);
        assert!(laser.on_attack(BodyId(8)).is_some());
    }

    #[test]
    fn aiming_line_never_damages() {
        let world = CollisionWorld::new();
        let mut line = laser(&LaserTuning::aiming_line());
        for _ in 0..50 {
            line.tick(&world, DT);
        }
        assert!((line.beam().length() - 1250.0).abs() < 1e-1);
        assert_eq!(line.area(), None);
        assert_eq!(line.on_attack(BodyId(1)), None);

        line.stop();
        for _ in 0..50 {
            line.tick(&world, DT);
        }
        assert!(line.is_spent());
    }
}
