//! Enemies share an [`EnemyBody`] (controller, health, velocity policy) and
//! plug their own state tables in through [`Enemy`].

mod guard;
mod mob;
mod patrol;

use motion::{Aabb, BodyBounds, BodyId, CollisionWorld, Controller, ControllerSettings, FrameTime, Layer, Vec2, collidable_mask};

pub use guard::{Guard, GuardState};
pub use mob::{Mob, MobState};
pub use patrol::{Patrol, PatrolState};

use crate::{
    combat::{AttackSource, Hit, HitVolume},
    kinematics::{Acceleration, Kinematics},
    projectile::Spawner,
    signal::Signal,
    tuning::{EnemyTuning, TuningError},
};

/// Everything an enemy touches during its tick.
pub struct EnemyContext<'a> {
    pub world: &'a mut CollisionWorld,
    pub clock: FrameTime,
    pub signals: &'a mut Vec<Signal>,
    pub spawner: &'a mut Spawner,
}

#[derive(Clone, Debug)]
pub struct EnemyBody {
    pub(crate) controller: Controller,
    pub(crate) kinematics: Kinematics,
    pub(crate) tuning: EnemyTuning,
    pub(crate) health: i32,
    pub(crate) max_speed: f32,
    pub(crate) contact: HitVolume,
    pub(crate) attack_enabled: bool,
}

impl EnemyBody {
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        tuning: EnemyTuning,
        settings: ControllerSettings,
        reference_speed: f32,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let controller = Controller::new(world, Layer::Enemy, position, tuning.bounds, collidable_mask(), settings)?;
        Ok(Self {
            controller,
            kinematics: Kinematics::default(),
            health: tuning.health,
            max_speed: reference_speed * tuning.speed_relative_to_reference,
            contact: HitVolume::contact(tuning.attack_volume),
            attack_enabled: true,
            tuning,
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

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// World-space velocity.
    pub fn velocity(&self) -> Vec2 {
        self.controller.to_local(self.kinematics.velocity)
    }

    pub fn heading_right(&self) -> bool {
        self.controller.heading_right()
    }

    pub fn flip(&mut self, world: &mut CollisionWorld) {
        self.kinematics.flip(&mut self.controller, world);
    }

    pub fn set_heading_right(&mut self, world: &mut CollisionWorld, heading_right: bool) {
        self.kinematics
            .face(&mut self.controller, world, heading_right);
    }

    /// Steer towards `target_x` (local frame), fall, move and cancel vertical
    /// speed on a floor or ceiling.
    pub fn advance(&mut self, world: &mut CollisionWorld, target_x: f32, dt: f32) {
        let acceleration = Acceleration {
            grounded: self.tuning.acceleration_time_grounded,
            airborne: self.tuning.acceleration_time_airborne,
        };
        let grounded = self.controller.collisions().below.any();
        self.kinematics
            .steer(target_x, grounded, acceleration, self.tuning.gravity, dt);
        self.kinematics.step(&mut self.controller, world, dt);
    }

    /// No ground just ahead of the leading bottom corner.
    pub fn cliff_on_front(&self, world: &CollisionWorld) -> bool {
        let bounds = self.controller.world_bounds();
        let direction = self.controller.facing();
        let origin = Vec2::new(
            bounds.center.x + direction * bounds.half_extents.x,
            bounds.center.y + bounds.half_extents.y,
        );
        let ray = Vec2::new(direction * 0.01, -bounds.size().y - 0.01);
        world
            .raycast(origin, ray, ray.norm(), self.controller.collision_mask(), Some(self.body()))
            .is_none()
    }

    /// Apply a hit: lose health, turn to the attacker and get knocked back.
    /// Returns true when this hit killed the enemy.
    pub fn take_damage(&mut self, world: &mut CollisionWorld, hit: &Hit) -> bool {
        self.health -= hit.damage;
        let died = self.health <= 0;

        let attacker_on_right = hit.attacker_on_right_of(self.position().x);
        self.set_heading_right(world, attacker_on_right);
        let knockback = hit.knockback.unwrap_or(self.tuning.default_knockback);
        self.kinematics.knock_back(knockback);
        died
    }

    pub fn contact_area(&self) -> Option<Aabb> {
        if !self.attack_enabled {
            return None;
        }
        self.contact
            .area(self.controller.position(), self.controller.facing())
    }

    pub(crate) fn contact_hit(&self, source: AttackSource) -> Hit {
        Hit {
            source,
            attacker_x: self.position().x,
            damage: 1,
            knockback: None,
        }
    }

    pub(crate) fn animate(&self, ctx: &mut EnemyContext<'_>, clip: &'static str) {
        ctx.signals.push(Signal::Animation {
            body: self.body(),
            clip,
        });
    }

    pub(crate) fn detector_bounds(&self, bounds: BodyBounds) -> Aabb {
        bounds.world(self.controller.position(), self.controller.facing())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Patrol,
    Guard,
    Mob,
}

/// Capabilities the simulation drives every enemy through.
pub trait Enemy {
    fn kind(&self) -> EnemyKind;

    fn body(&self) -> &EnemyBody;

    fn body_mut(&mut self) -> &mut EnemyBody;

    fn tick(&mut self, ctx: &mut EnemyContext<'_>);

    fn on_damaged(&mut self, hit: &Hit, ctx: &mut EnemyContext<'_>);

    /// Hit dealt to the player touching this enemy, if it can attack now.
    fn on_attack(&mut self, ctx: &mut EnemyContext<'_>) -> Option<Hit>;

    /// The damage detector is off once dead.
    fn accepts_damage(&self) -> bool {
        true
    }

    /// Removed from the world; the simulation drops it.
    fn is_despawned(&self) -> bool {
        false
    }

    fn attack_area(&self) -> Option<Aabb> {
        self.body().contact_area()
    }
}
