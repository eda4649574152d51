//! Keeps its distance: aims and fires a laser at long range, throws a burst
//! of particles at close range and jumps back afterwards.

use motion::{CollisionWorld, ControllerSettings, Layer, Vec2};

use super::{Enemy, EnemyBody, EnemyContext, EnemyKind};
use crate::{
    combat::{AttackSource, Hit, TargetDetector},
    projectile::ProjectileId,
    state_machine::{ActorState, StateMachine, StateRules, undefined_state, update_state},
    tuning::{GuardTuning, TuningError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuardState {
    None,
    Idle,
    Walking,
    Turning,
    FarReady,
    NearReady,
    FarShoot,
    NearShoot,
    BackJumping,
    Hit,
    Dead,
}

impl ActorState for GuardState {
    const NONE: Self = GuardState::None;
}

#[derive(Clone, Debug)]
pub struct Guard {
    body: EnemyBody,
    machine: StateMachine<GuardState>,
    tuning: GuardTuning,
    near_detector: TargetDetector,
    far_detector: TargetDetector,
    aiming_line: Option<ProjectileId>,
    laser: Option<ProjectileId>,
}

impl Guard {
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        tuning: GuardTuning,
        settings: ControllerSettings,
        reference_speed: f32,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let body = EnemyBody::new(world, position, tuning.enemy.clone(), settings, reference_speed)?;
        let player = Layer::Player.as_mask();
        Ok(Self {
            body,
            machine: StateMachine::new(GuardState::Idle),
            near_detector: TargetDetector::new(tuning.near_detector, player),
            far_detector: TargetDetector::new(tuning.far_detector, player),
            aiming_line: None,
            laser: None,
            tuning,
        })
    }

    pub fn state(&self) -> GuardState {
        self.machine.state()
    }

    /// Beam currently being aimed or fired, if any.
    pub fn active_beam(&self) -> Option<ProjectileId> {
        self.laser.or(self.aiming_line)
    }

    fn sees(&self, detector: &TargetDetector, world: &CollisionWorld) -> bool {
        let controller = self.body.controller();
        detector.target_found(world, controller.position(), controller.facing(), controller.body())
    }

    fn muzzle(&self) -> Vec2 {
        let offset = self.tuning.muzzle_offset;
        self.body.position() + Vec2::new(offset.x * self.body.controller().facing(), offset.y)
    }
}

impl<'a> StateRules<EnemyContext<'a>> for Guard {
    type State = GuardState;

    fn machine(&self) -> &StateMachine<GuardState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<GuardState> {
        &mut self.machine
    }

    fn next_state_from_environment(&self, state: GuardState, ctx: &EnemyContext<'a>) -> GuardState {
        use GuardState::*;

        let world = &*ctx.world;
        let near = || self.sees(&self.near_detector, world);
        let far = || self.sees(&self.far_detector, world);
        let timer_running = self.machine.timer_running(ctx.clock.now);
        let collisions = self.body.controller.collisions();

        match state {
            Idle => Walking,
            Walking if near() => NearReady,
            Walking if far() => FarReady,
            Walking if collisions.front.any() || self.body.cliff_on_front(world) => Turning,
            Walking => Walking,
            Turning => Walking,
            FarReady if near() => NearReady,
            FarReady if timer_running => FarReady,
            FarReady => FarShoot,
            NearReady if timer_running => NearReady,
            NearReady => NearShoot,
            FarShoot if timer_running => FarShoot,
            FarShoot if near() => NearReady,
            FarShoot if far() => FarReady,
            FarShoot => Idle,
            NearShoot if timer_running => NearShoot,
            NearShoot => BackJumping,
            BackJumping if collisions.below.any() => Idle,
            BackJumping => BackJumping,
            Hit if timer_running => Hit,
            Hit => Idle,
            Dead => Dead,
            other => undefined_state("guard", other),
        }
    }

    fn on_transition(&mut self, from: GuardState, to: GuardState, ctx: &mut EnemyContext<'a>) {
        let now = ctx.clock.now;

        match from {
            GuardState::FarReady => {
                if let Some(id) = self.aiming_line.take() {
                    ctx.spawner.stop(id);
                }
            }
            GuardState::FarShoot => {
                if let Some(id) = self.laser.take() {
                    ctx.spawner.stop(id);
                }
            }
            GuardState::Hit => self.body.attack_enabled = true,
            _ => {}
        }

        let heading_right = self.body.heading_right();
        match to {
            GuardState::Turning => {
                self.body.flip(ctx.world);
                self.body.kinematics.velocity.x = 0.0;
            }
            GuardState::FarReady => {
                self.machine.start_timer(now, self.tuning.far_ready_time);
                self.aiming_line = Some(
                    ctx.spawner
                        .beam(self.muzzle(), heading_right, &self.tuning.aiming_line),
                );
            }
            GuardState::NearReady => {
                let deadline = now + self.tuning.near_ready_time;
                if from == GuardState::FarReady {
                    // Never wait longer than the aim that was already running.
                    self.machine
                        .set_deadline(self.machine.deadline().min(deadline));
                } else {
                    self.machine.set_deadline(deadline);
                }
            }
            GuardState::FarShoot => {
                self.machine.start_timer(now, self.tuning.far_shoot_time);
                self.laser = Some(ctx.spawner.beam(self.muzzle(), heading_right, &self.tuning.laser));
            }
            GuardState::NearShoot => {
                self.machine.start_timer(now, self.tuning.near_shoot_time);
                ctx.spawner.particles(
                    self.muzzle(),
                    heading_right,
                    self.tuning.near_shoot_particles,
                    &self.tuning.particle,
                );
            }
            GuardState::BackJumping => {
                let jump = self.tuning.back_jump_velocity;
                self.body.kinematics.velocity += Vec2::new(-jump.x, jump.y);
            }
            GuardState::Hit => {
                self.machine.start_timer(now, self.tuning.hit_time);
                self.body.attack_enabled = false;
            }
            GuardState::Dead => self.body.attack_enabled = false,
            _ => {}
        }
    }

    fn update_animation_state(&mut self, state: GuardState, ctx: &mut EnemyContext<'a>) {
        let clip = match state {
            GuardState::Idle => "GuardIdle",
            GuardState::Walking | GuardState::Turning => "GuardWalk",
            GuardState::FarReady | GuardState::FarShoot => "GuardShootFar",
            GuardState::NearReady | GuardState::NearShoot => "GuardShootNear",
            GuardState::BackJumping => "GuardBackJump",
            GuardState::Hit | GuardState::Dead => "GuardHit",
            other => undefined_state("guard animation", other),
        };
        self.body.animate(ctx, clip);
    }
}

impl Enemy for Guard {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Guard
    }

    fn body(&self) -> &EnemyBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut EnemyBody {
        &mut self.body
    }

    fn tick(&mut self, ctx: &mut EnemyContext<'_>) {
        let target = match self.machine.state() {
            GuardState::Walking => self.body.max_speed,
            _ => 0.0,
        };
        self.body.advance(ctx.world, target, ctx.clock.dt);
        update_state(self, ctx);
    }

    fn on_damaged(&mut self, hit: &Hit, ctx: &mut EnemyContext<'_>) {
        let died = self.body.take_damage(ctx.world, hit);
        self.machine
            .request(if died { GuardState::Dead } else { GuardState::Hit });
    }

    fn on_attack(&mut self, _ctx: &mut EnemyContext<'_>) -> Option<Hit> {
        self.body
            .attack_enabled
            .then(|| self.body.contact_hit(AttackSource::Guard))
    }

    fn accepts_damage(&self) -> bool {
        self.machine.state() != GuardState::Dead
    }
}
