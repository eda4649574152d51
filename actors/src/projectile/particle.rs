use motion::{BodyBounds, BodyId, CollisionWorld, Controller, ControllerSettings, Layer, Space, Vec2, collidable_mask};
use rand::Rng;

use crate::{
    combat::{AttackSource, Hit},
    tuning::{ParticleTuning, TuningError},
};

/// Speed falls off as `((R - t) / R)^12` over the lifetime `R`.
const DECAY_ORDER: i32 = 12;

/// A spark thrown forward and down by a close-range shot. It slows to a halt
/// over its lifetime and explodes on the first target it touches while still
/// hot.
#[derive(Clone, Debug)]
pub struct Particle {
    controller: Controller,
    initial_velocity: Vec2,
    age: f32,
    remaining_time: f32,
    attackable_time: f32,
    spent: bool,
}

impl Particle {
    pub fn new<R: Rng>(
        world: &mut CollisionWorld,
        origin: Vec2,
        heading_right: bool,
        tuning: &ParticleTuning,
        reference_speed: f32,
        settings: ControllerSettings,
        rng: &mut R,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let mut controller = Controller::new(
            world,
            Layer::Effect,
            origin,
            BodyBounds::centered(tuning.half_extents),
            collidable_mask(),
            settings,
        )?;
        controller.set_heading_right(world, heading_right);

        let angle = rng
            .gen_range(tuning.angle_range.0..=tuning.angle_range.1)
            .to_radians();
        let speed = reference_speed * rng.gen_range(tuning.speed_range.0..=tuning.speed_range.1);
        Ok(Self {
            controller,
            initial_velocity: speed * Vec2::new(angle.cos(), angle.sin()),
            age: 0.0,
            remaining_time: tuning.remaining_time,
            attackable_time: tuning.attackable_time,
            spent: false,
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn body(&self) -> BodyId {
        self.controller.body()
    }

    pub fn position(&self) -> Vec2 {
        self.controller.position()
    }

    /// Launch velocity in the local frame (x forward).
    pub fn initial_velocity(&self) -> Vec2 {
        self.initial_velocity
    }

    /// Visual size factor, 1 at launch and 0 at the end of its life.
    pub fn scale(&self) -> f32 {
        ((self.remaining_time - self.age) / self.remaining_time).max(0.0)
    }

    pub fn velocity(&self) -> Vec2 {
        self.scale().powi(DECAY_ORDER) * self.initial_velocity
    }

    pub fn tick(&mut self, world: &mut CollisionWorld, dt: f32) {
        if self.spent {
            return;
        }
        if self.age >= self.remaining_time {
            self.spent = true;
            return;
        }
        let velocity = self.velocity();
        self.controller
            .move_by(world, velocity * dt, Space::Local);
        self.age += dt;
    }

    pub fn is_attackable(&self) -> bool {
        !self.spent && self.age <= self.attackable_time
    }

    /// Explode on contact: one damage, then the particle is gone.
    pub fn on_attack(&mut self) -> Option<Hit> {
        if !self.is_attackable() {
            return None;
        }
        self.spent = true;
        Some(Hit {
            source: AttackSource::Particle,
            attacker_x: self.position().x,
            damage: 1,
            knockback: None,
        })
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn despawn(self, world: &mut CollisionWorld) {
        self.controller.despawn(world);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn spawn(world: &mut CollisionWorld, heading_right: bool, seed: u64) -> Particle {
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        Particle::new(
            world,
            Vec2::new(0.0, 10.0),
            heading_right,
            &ParticleTuning::default(),
            25.0,
            ControllerSettings::default(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn launches_forward_and_down() {
        let mut world = CollisionWorld::new();
        for seed in 0..16 {
            let p = spawn(&mut world, true, seed);
            let v = p.initial_velocity();
            assert!(v.x >= -1e-4 && v.y <= 1e-4);
            let speed = v.norm();
            assert!((25.0 - 1e-3..=125.0 + 1e-3).contains(&speed));
        }
    }

    #[test]
    fn same_seed_same_burst() {
        let mut world = CollisionWorld::new();
        let a = spawn(&mut world, true, 42);
        let b = spawn(&mut world, true, 42);
        assert_eq!(a.initial_velocity(), b.initial_velocity());
    }

    #[test]
    fn moves_along_facing_and_decays() {
        let mut world = CollisionWorld::new();
        let mut p = spawn(&mut world, false, 3);
        let forward = p.initial_velocity().x;
        p.tick(&mut world, DT);
        if forward > 1e-3 {
            assert!(p.position().x < 0.0);
        }
        assert!(p.velocity().norm() < p.initial_velocity().norm());
    }

    #[test]
    fn cools_down_then_expires() {
        let mut world = CollisionWorld::new();
        let mut p = spawn(&mut world, true, 9);
        for _ in 0..100 {
            p.tick(&mut world, DT);
        }
        assert!(!p.is_attackable());
        assert_eq!(p.on_attack(), None);
        assert!(!p.is_spent());
        for _ in 0..30 {
            p.tick(&mut world, DT);
        }
        assert!(p.is_spent());
    }

    #[test]
    fn explodes_once() {
        let mut world = CollisionWorld::new();
        let mut p = spawn(&mut world, true, 1);
        p.tick(&mut world, DT);
        let hit = p.on_attack().unwrap();
        assert_eq!(hit.source, AttackSource::Particle);
        assert!(p.is_spent());
        assert_eq!(p.on_attack(), None);
        p.despawn(&mut world);
    }
}
