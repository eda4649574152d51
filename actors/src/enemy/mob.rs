//! A harmless bystander. It only flinches when hit and vanishes when killed.

use motion::{Aabb, CollisionWorld, ControllerSettings, Vec2};

use super::{Enemy, EnemyBody, EnemyContext, EnemyKind};
use crate::{
    combat::{AttackSource, Hit},
    state_machine::{ActorState, StateMachine, StateRules, undefined_state, update_state},
    tuning::{MobTuning, TuningError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MobState {
    None,
    Idle,
    Pressed,
    Hit,
}

impl ActorState for MobState {
    const NONE: Self = MobState::None;
}

#[derive(Clone, Debug)]
pub struct Mob {
    body: EnemyBody,
    machine: StateMachine<MobState>,
    tuning: MobTuning,
    despawned: bool,
}

impl Mob {
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        tuning: MobTuning,
        settings: ControllerSettings,
        reference_speed: f32,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let mut body = EnemyBody::new(world, position, tuning.enemy.clone(), settings, reference_speed)?;
        body.attack_enabled = false;
        Ok(Self {
            body,
            machine: StateMachine::new(MobState::Idle),
            tuning,
            despawned: false,
        })
    }

    pub fn state(&self) -> MobState {
        self.machine.state()
    }
}

impl<'a> StateRules<EnemyContext<'a>> for Mob {
    type State = MobState;

    fn machine(&self) -> &StateMachine<MobState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<MobState> {
        &mut self.machine
    }

    fn next_state_from_environment(&self, state: MobState, ctx: &EnemyContext<'a>) -> MobState {
        match state {
            MobState::Idle => MobState::Idle,
            MobState::Pressed | MobState::Hit if self.machine.timer_running(ctx.clock.now) => state,
            MobState::Pressed | MobState::Hit => MobState::Idle,
            other => undefined_state("mob", other),
        }
    }

    fn on_transition(&mut self, _from: MobState, _to: MobState, _ctx: &mut EnemyContext<'a>) {}

    fn update_animation_state(&mut self, state: MobState, ctx: &mut EnemyContext<'a>) {
        let clip = match state {
            MobState::Idle => "MobIdle",
            MobState::Pressed => "MobPressed",
            MobState::Hit => "MobHit",
            other => undefined_state("mob animation", other),
        };
        self.body.animate(ctx, clip);
    }
}

impl Enemy for Mob {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Mob
    }

    fn body(&self) -> &EnemyBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut EnemyBody {
        &mut self.body
    }

    fn tick(&mut self, ctx: &mut EnemyContext<'_>) {
        if self.despawned {
            return;
        }
        self.body.advance(ctx.world, 0.0, ctx.clock.dt);
        update_state(self, ctx);
    }

    fn on_damaged(&mut self, hit: &Hit, ctx: &mut EnemyContext<'_>) {
        if self.despawned {
            return;
        }
        if self.body.take_damage(ctx.world, hit) {
            log::debug!("mob {:?} despawns", self.body.body());
            self.despawned = true;
            return;
        }
        let reaction = match hit.source {
            // Stomped by the small form.
            AttackSource::Julia => MobState::Pressed,
            _ => MobState::Hit,
        };
        self.machine
            .start_timer(ctx.clock.now, self.tuning.flinch_duration);
        self.machine.request(reaction);
    }

    fn on_attack(&mut self, _ctx: &mut EnemyContext<'_>) -> Option<Hit> {
        None
    }

    fn accepts_damage(&self) -> bool {
        !self.despawned
    }

    fn is_despawned(&self) -> bool {
        self.despawned
    }

    fn attack_area(&self) -> Option<Aabb> {
        None
    }
}

#[cfg(test)]
mod tests {
    use motion::{Aabb, FrameTime, Layer};

    use super::*;
    use crate::{projectile::Spawner, signal::Signal};

    const DT: f32 = 1.0 / 60.0;

    fn hit(source: AttackSource, damage: i32) -> Hit {
        Hit {
            source,
            attacker_x: -2.0,
            damage,
            knockback: Some(Vec2::zeros()),
        }
    }

    #[test]
    fn stomp_presses_and_recovers() {
        let mut world = CollisionWorld::new();
        world.insert(
            Layer::Obstacle,
            Aabb::from_min_max(Vec2::new(-10.0, -3.0), Vec2::new(10.0, -1.5)),
        );
        let mut signals: Vec<Signal> = Vec::new();
        let mut spawner = Spawner::default();
        let mut mob = Mob::new(
            &mut world,
            Vec2::zeros(),
            MobTuning::default(),
            ControllerSettings::default(),
            25.0,
        )
        .unwrap();
        assert_eq!(mob.attack_area(), None);

        let mut clock = FrameTime::new(0.0, DT);
        {
            let mut ctx = EnemyContext {
                world: &mut world,
                clock,
                signals: &mut signals,
                spawner: &mut spawner,
            };
            mob.on_damaged(&hit(AttackSource::Julia, 1), &mut ctx);
            mob.tick(&mut ctx);
        }
        assert_eq!(mob.state(), MobState::Pressed);
        assert_eq!(
            signals.last(),
            Some(&Signal::Animation {
                body: mob.body().body(),
                clip: "MobPressed"
            })
        );

        for _ in 0..30 {
            clock = clock.advanced(DT);
            let mut ctx = EnemyContext {
                world: &mut world,
                clock,
                signals: &mut signals,
                spawner: &mut spawner,
            };
            mob.tick(&mut ctx);
        }
        assert_eq!(mob.state(), MobState::Idle);
    }

    #[test]
    fn other_hits_flinch_and_lethal_hit_despawns() {
        let mut world = CollisionWorld::new();
        let mut signals = Vec::new();
        let mut spawner = Spawner::default();
        let mut mob = Mob::new(
            &mut world,
            Vec2::zeros(),
            MobTuning::default(),
            ControllerSettings::default(),
            25.0,
        )
        .unwrap();
        let mut ctx = EnemyContext {
            world: &mut world,
            clock: FrameTime::new(0.0, DT),
            signals: &mut signals,
            spawner: &mut spawner,
        };
        mob.on_damaged(&hit(AttackSource::Juliett, 1), &mut ctx);
        mob.tick(&mut ctx);
        assert_eq!(mob.state(), MobState::Hit);
        assert_eq!(mob.body().health(), 5);

        mob.on_damaged(&hit(AttackSource::Laser, 5), &mut ctx);
        assert!(mob.is_despawned());
        assert!(!mob.accepts_damage());
    }
}
