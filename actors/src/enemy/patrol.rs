//! Walks back and forth, turns at walls and cliffs, speeds up once it spots
//! the player and searches both ways after losing it.

use motion::{CollisionWorld, ControllerSettings, Layer, Vec2};

use super::{Enemy, EnemyBody, EnemyContext, EnemyKind};
use crate::{
    combat::{AttackSource, Hit, TargetDetector},
    state_machine::{ActorState, StateMachine, StateRules, undefined_state, update_state},
    tuning::{PatrolTuning, TuningError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatrolState {
    None,
    Normal,
    Turning,
    AlertDelay,
    Alert,
    SearchingLeft,
    SearchingRight,
    PostAttackDelay,
    Hit,
    Dead,
}

impl ActorState for PatrolState {
    const NONE: Self = PatrolState::None;
}

#[derive(Clone, Debug)]
pub struct Patrol {
    body: EnemyBody,
    machine: StateMachine<PatrolState>,
    tuning: PatrolTuning,
    player_detector: TargetDetector,
}

impl Patrol {
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        tuning: PatrolTuning,
        settings: ControllerSettings,
        reference_speed: f32,
    ) -> Result<Self, TuningError> {
        tuning.validate(&settings)?;
        let body = EnemyBody::new(world, position, tuning.enemy.clone(), settings, reference_speed)?;
        Ok(Self {
            body,
            machine: StateMachine::new(PatrolState::Normal),
            player_detector: TargetDetector::new(tuning.player_detector, Layer::Player.as_mask()),
            tuning,
        })
    }

    pub fn state(&self) -> PatrolState {
        self.machine.state()
    }

    fn player_in_sight(&self, ctx: &EnemyContext<'_>) -> bool {
        let controller = self.body.controller();
        self.player_detector
            .target_found(ctx.world, controller.position(), controller.facing(), controller.body())
    }

    fn target_speed(&self) -> f32 {
        match self.machine.state() {
            PatrolState::Normal | PatrolState::Alert | PatrolState::SearchingLeft | PatrolState::SearchingRight => {
                self.body.max_speed
            }
            _ => 0.0,
        }
    }
}

impl<'a> StateRules<EnemyContext<'a>> for Patrol {
    type State = PatrolState;

    fn machine(&self) -> &StateMachine<PatrolState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<PatrolState> {
        &mut self.machine
    }

    fn next_state_from_environment(&self, state: PatrolState, ctx: &EnemyContext<'a>) -> PatrolState {
        use PatrolState::*;

        let timer_running = self.machine.timer_running(ctx.clock.now);
        match state {
            Normal if self.body.controller.collisions().front.any() || self.body.cliff_on_front(ctx.world) => Turning,
            Normal if self.player_in_sight(ctx) => AlertDelay,
            Normal => Normal,
            Turning => Normal,
            AlertDelay if timer_running => AlertDelay,
            AlertDelay => Alert,
            Alert if self.player_in_sight(ctx) => Alert,
            Alert => SearchingLeft,
            SearchingLeft | SearchingRight if self.player_in_sight(ctx) => Alert,
            SearchingLeft if timer_running => SearchingLeft,
            SearchingLeft => SearchingRight,
            SearchingRight if timer_running => SearchingRight,
            SearchingRight => Normal,
            PostAttackDelay if timer_running => PostAttackDelay,
            PostAttackDelay => Alert,
            Hit if timer_running => Hit,
            Hit => Alert,
            Dead => Dead,
            other => undefined_state("patrol", other),
        }
    }

    fn on_transition(&mut self, from: PatrolState, to: PatrolState, ctx: &mut EnemyContext<'a>) {
        let now = ctx.clock.now;
        let multiplier = self.tuning.alert_speed_multiplier;

        match from {
            PatrolState::Alert | PatrolState::SearchingLeft | PatrolState::SearchingRight => {
                self.body.max_speed /= multiplier;
            }
            PatrolState::Hit => self.body.attack_enabled = true,
            _ => {}
        }

        match to {
            PatrolState::Turning => {
                self.body.flip(ctx.world);
                self.body.kinematics.velocity.x = 0.0;
            }
            PatrolState::AlertDelay => self.machine.start_timer(now, self.tuning.delay_on_alert),
            PatrolState::Alert => self.body.max_speed *= multiplier,
            PatrolState::SearchingLeft | PatrolState::SearchingRight => {
                self.body.max_speed *= multiplier;
                self.body
                    .set_heading_right(ctx.world, to == PatrolState::SearchingRight);
                self.machine.start_timer(now, self.tuning.search_duration);
            }
            PatrolState::PostAttackDelay => self.machine.start_timer(now, self.tuning.delay_after_attack),
            PatrolState::Hit => {
                self.body.attack_enabled = false;
                self.machine.start_timer(now, self.tuning.delay_after_hit);
            }
            PatrolState::Dead => self.body.attack_enabled = false,
            _ => {}
        }
    }

    fn update_animation_state(&mut self, state: PatrolState, ctx: &mut EnemyContext<'a>) {
        let clip = match state {
            PatrolState::Normal | PatrolState::Turning => "PatrolNormal",
            PatrolState::AlertDelay
            | PatrolState::Alert
            | PatrolState::SearchingLeft
            | PatrolState::SearchingRight
            | PatrolState::PostAttackDelay
            | PatrolState::Hit => "PatrolAlert",
            PatrolState::Dead => "PatrolNormalDead",
            other => undefined_state("patrol animation", other),
        };
        self.body.animate(ctx, clip);
    }
}

impl Enemy for Patrol {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Patrol
    }

    fn body(&self) -> &EnemyBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut EnemyBody {
        &mut self.body
    }

    fn tick(&mut self, ctx: &mut EnemyContext<'_>) {
        let target = self.target_speed();
        self.body.advance(ctx.world, target, ctx.clock.dt);
        update_state(self, ctx);
    }

    fn on_damaged(&mut self, hit: &Hit, ctx: &mut EnemyContext<'_>) {
        if self.body.take_damage(ctx.world, hit) {
            self.machine.request(PatrolState::Dead);
        }
        self.machine.request(PatrolState::Hit);
    }

    fn on_attack(&mut self, _ctx: &mut EnemyContext<'_>) -> Option<Hit> {
        if !self.body.attack_enabled {
            return None;
        }
        self.body.kinematics.velocity -= self.tuning.move_back_after_attack;
        self.machine.request(PatrolState::PostAttackDelay);
        Some(self.body.contact_hit(AttackSource::Patrol))
    }

    fn accepts_damage(&self) -> bool {
        self.machine.state() != PatrolState::Dead
    }
}

#[cfg(test)]
mod tests {
    use motion::{Aabb, FrameTime};

    use super::*;
    use crate::{projectile::Spawner, signal::Signal};

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        world: CollisionWorld,
        signals: Vec<Signal>,
        spawner: Spawner,
        clock: FrameTime,
    }

    impl Rig {
        fn new() -> Self {
            let mut world = CollisionWorld::new();
            // Floor from x = -60 to x = 20, top at y = -1.5.
            world.insert(
                Layer::Obstacle,
                Aabb::from_min_max(Vec2::new(-60.0, -3.0), Vec2::new(20.0, -1.5)),
            );
            Self {
                world,
                signals: Vec::new(),
                spawner: Spawner::default(),
                clock: FrameTime::new(0.0, DT),
            }
        }

        fn ctx(&mut self) -> EnemyContext<'_> {
            EnemyContext {
                world: &mut self.world,
                clock: self.clock,
                signals: &mut self.signals,
                spawner: &mut self.spawner,
            }
        }

        fn patrol(&mut self, x: f32) -> Patrol {
            Patrol::new(
                &mut self.world,
                Vec2::new(x, 0.0),
                PatrolTuning::default(),
                ControllerSettings::default(),
                25.0,
            )
            .unwrap()
        }

        fn run(&mut self, patrol: &mut Patrol, seconds: f32) {
            for _ in 0..(seconds / DT).round() as usize {
                self.step(patrol);
            }
        }

        fn step(&mut self, patrol: &mut Patrol) {
            self.clock = self.clock.advanced(DT);
            let mut ctx = self.ctx();
            patrol.tick(&mut ctx);
        }

        /// Tick until the state changes, up to `limit` seconds.
        fn run_until_left(&mut self, patrol: &mut Patrol, state: PatrolState, limit: f32) {
            for _ in 0..(limit / DT).round() as usize {
                if patrol.state() != state {
                    return;
                }
                self.step(patrol);
            }
        }
    }

    #[test]
    fn turns_back_at_the_cliff() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(15.0);
        let mut turned = false;
        for _ in 0..120 {
            rig.run(&mut patrol, DT);
            if !patrol.body().heading_right() {
                turned = true;
                break;
            }
        }
        assert!(turned);
        assert!(patrol.body().position().x < 20.0);
        assert!(rig.signals.contains(&Signal::Animation {
            body: patrol.body().body(),
            clip: "PatrolNormal"
        }));
    }

    #[test]
    fn spots_player_and_speeds_up() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(-10.0);
        rig.world.insert(
            Layer::Player,
            Aabb::new(Vec2::new(-4.0, 0.0), Vec2::new(1.0, 1.5)),
        );
        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::AlertDelay);

        rig.run_until_left(&mut patrol, PatrolState::AlertDelay, 1.1);
        assert_eq!(patrol.state(), PatrolState::Alert);
        assert!((patrol.body().max_speed() - 25.0 * 1.3).abs() < 1e-3);
    }

    #[test]
    fn searches_both_ways_then_calms_down() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(0.0);
        patrol.machine.request(PatrolState::Alert);
        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::Alert);

        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::SearchingLeft);
        assert!(!patrol.body().heading_right());

        rig.run(&mut patrol, 0.9);
        assert_eq!(patrol.state(), PatrolState::SearchingLeft);
        rig.run_until_left(&mut patrol, PatrolState::SearchingLeft, 0.2);
        assert_eq!(patrol.state(), PatrolState::SearchingRight);
        assert!(patrol.body().heading_right());
        assert!((patrol.body().max_speed() - 25.0 * 1.3).abs() < 1e-3);

        rig.run(&mut patrol, 0.9);
        rig.run_until_left(&mut patrol, PatrolState::SearchingRight, 0.2);
        assert_eq!(patrol.state(), PatrolState::Normal);
        assert!((patrol.body().max_speed() - 25.0).abs() < 1e-3);
    }

    #[test]
    fn attack_backs_off_and_waits() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(0.0);
        let hit = {
            let mut ctx = rig.ctx();
            patrol.on_attack(&mut ctx)
        }
        .unwrap();
        assert_eq!(hit.knockback, None);
        assert_eq!(hit.damage, 1);
        assert!(patrol.body().velocity().x < 0.0);

        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::PostAttackDelay);
    }

    #[test]
    fn dies_instead_of_flinching() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(0.0);
        let hit = Hit {
            source: AttackSource::Juliett,
            attacker_x: 3.0,
            damage: 6,
            knockback: None,
        };
        {
            let mut ctx = rig.ctx();
            patrol.on_damaged(&hit, &mut ctx);
        }
        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::Dead);
        assert!(!patrol.accepts_damage());
        assert_eq!(patrol.attack_area(), None);
        let mut ctx = rig.ctx();
        assert_eq!(patrol.on_attack(&mut ctx), None);
    }

    #[test]
    fn flinch_disables_attack_until_alert() {
        let mut rig = Rig::new();
        let mut patrol = rig.patrol(0.0);
        let hit = Hit {
            source: AttackSource::Juliett,
            attacker_x: -3.0,
            damage: 1,
            knockback: None,
        };
        {
            let mut ctx = rig.ctx();
            patrol.on_damaged(&hit, &mut ctx);
        }
        rig.run(&mut patrol, DT);
        assert_eq!(patrol.state(), PatrolState::Hit);
        assert!(patrol.attack_area().is_none());

        rig.run(&mut patrol, 0.9);
        assert_eq!(patrol.state(), PatrolState::Hit);
        rig.run_until_left(&mut patrol, PatrolState::Hit, 0.2);
        assert_eq!(patrol.state(), PatrolState::Alert);
        assert!(patrol.attack_area().is_some());
    }
}
