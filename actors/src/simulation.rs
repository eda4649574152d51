//! Composition root: owns the collision world and every actor, advances them
//! one tick at a time and routes attack and damage between them.
//!
//! Tick order:
//! 1. advance the clock (the delta is capped at [`MAX_FRAME_TIME`])
//! 2. moving platforms, pushing and carrying riders through their controllers
//! 3. falling bodies
//! 4. combat from the overlaps left by the previous tick
//! 5. player, then enemies (state requests from combat resolve here)
//! 6. spawn requests queued by enemies
//! 7. projectiles
//! 8. despawned entities leave the world

use motion::{
    Aabb, BodyBounds, BodyId, CollisionWorld, Controller, ControllerSettings, FallingBody, FallingBodyConfig,
    FrameTime, Layer, MovingPlatform, PassengerRegistry, PlatformConfig, Vec2,
};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    enemy::{Enemy, EnemyContext, Guard, Mob, Patrol},
    player::Player,
    projectile::{Laser, Particle, SpawnRequest, Spawner},
    signal::Signal,
    tuning::{GuardTuning, MobTuning, PatrolTuning, PlayerTuning, TuningError},
};

/// Longest step a single tick integrates (seconds).
pub const MAX_FRAME_TIME: f32 = 0.125;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub controller: ControllerSettings,
    pub player: PlayerTuning,
    pub patrol: PatrolTuning,
    pub guard: GuardTuning,
    pub mob: MobTuning,
    pub falling: FallingBodyConfig,
    /// Seed for particle bursts.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            controller: ControllerSettings::default(),
            player: PlayerTuning::default(),
            patrol: PatrolTuning::default(),
            guard: GuardTuning::default(),
            mob: MobTuning::default(),
            falling: FallingBodyConfig::default(),
            seed: 0x5eed,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), TuningError> {
        self.controller.validate()?;
        self.player.validate(&self.controller)?;
        self.patrol.validate(&self.controller)?;
        self.guard.validate(&self.controller)?;
        self.mob.validate(&self.controller)?;
        Ok(())
    }
}

/// Controllers a platform may push: the player's and every enemy's.
struct Riders<'a> {
    player: &'a mut Controller,
    enemies: &'a mut [Box<dyn Enemy>],
}

impl PassengerRegistry for Riders<'_> {
    fn passenger_mut(&mut self, body: BodyId) -> Option<&mut Controller> {
        if self.player.body() == body {
            return Some(&mut *self.player);
        }
        self.enemies
            .iter_mut()
            .map(|enemy| &mut enemy.body_mut().controller)
            .find(|controller| controller.body() == body)
    }
}

pub struct Simulation {
    config: SimulationConfig,
    world: CollisionWorld,
    clock: FrameTime,
    player: Player,
    enemies: Vec<Box<dyn Enemy>>,
    platforms: Vec<MovingPlatform>,
    falling: Vec<FallingBody>,
    lasers: Vec<Laser>,
    particles: Vec<Particle>,
    spawner: Spawner,
    signals: Vec<Signal>,
    rng: Pcg64Mcg,
}

impl Simulation {
    pub fn new(config: SimulationConfig, player_position: Vec2) -> Result<Self, TuningError> {
        config.validate()?;
        let mut world = CollisionWorld::new();
        let player = Player::new(&mut world, player_position, config.player.clone(), config.controller)?;
        Ok(Self {
            rng: Pcg64Mcg::seed_from_u64(config.seed),
            config,
            world,
            clock: FrameTime::default(),
            player,
            enemies: Vec::new(),
            platforms: Vec::new(),
            falling: Vec::new(),
            lasers: Vec::new(),
            particles: Vec::new(),
            spawner: Spawner::default(),
            signals: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn clock(&self) -> FrameTime {
        self.clock
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> impl Iterator<Item = &dyn Enemy> {
        self.enemies.iter().map(|enemy| &**enemy)
    }

    pub fn enemy(&self, body: BodyId) -> Option<&dyn Enemy> {
        self.enemies().find(|enemy| enemy.body().body() == body)
    }

    pub fn platforms(&self) -> &[MovingPlatform] {
        &self.platforms
    }

    pub fn falling_bodies(&self) -> &[FallingBody] {
        &self.falling
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Speed enemies and projectiles scale from: the small form's move speed.
    fn reference_speed(&self) -> f32 {
        self.config.player.julia_move_speed
    }

    pub fn add_obstacle(&mut self, aabb: Aabb) -> BodyId {
        self.world.insert(Layer::Obstacle, aabb)
    }

    pub fn add_platform(
        &mut self,
        position: Vec2,
        bounds: BodyBounds,
        config: &PlatformConfig,
    ) -> Result<BodyId, TuningError> {
        config.validate()?;
        let platform = MovingPlatform::new(&mut self.world, position, bounds, config, self.config.controller)?;
        let body = platform.body();
        self.platforms.push(platform);
        Ok(body)
    }

    pub fn add_falling_body(&mut self, aabb: Aabb) -> Result<BodyId, TuningError> {
        let falling = FallingBody::new(&mut self.world, Layer::Obstacle, aabb, self.config.falling)?;
        let body = falling.body();
        self.falling.push(falling);
        Ok(body)
    }

    pub fn spawn_patrol(&mut self, position: Vec2) -> Result<BodyId, TuningError> {
        let reference_speed = self.reference_speed();
        let patrol = Patrol::new(
            &mut self.world,
            position,
            self.config.patrol.clone(),
            self.config.controller,
            reference_speed,
        )?;
        Ok(self.push_enemy(Box::new(patrol)))
    }

    pub fn spawn_guard(&mut self, position: Vec2) -> Result<BodyId, TuningError> {
        let reference_speed = self.reference_speed();
        let guard = Guard::new(
            &mut self.world,
            position,
            self.config.guard.clone(),
            self.config.controller,
            reference_speed,
        )?;
        Ok(self.push_enemy(Box::new(guard)))
    }

    pub fn spawn_mob(&mut self, position: Vec2) -> Result<BodyId, TuningError> {
        let reference_speed = self.reference_speed();
        let mob = Mob::new(
            &mut self.world,
            position,
            self.config.mob.clone(),
            self.config.controller,
            reference_speed,
        )?;
        Ok(self.push_enemy(Box::new(mob)))
    }

    fn push_enemy(&mut self, enemy: Box<dyn Enemy>) -> BodyId {
        let body = enemy.body().body();
        log::debug!("spawned {:?} as {body:?}", enemy.kind());
        self.enemies.push(enemy);
        body
    }

    pub fn set_horizontal_input(&mut self, input: f32) {
        self.player.set_horizontal_input(input);
    }

    pub fn on_action_button_clicked(&mut self) {
        self.player.on_action_button_clicked();
    }

    /// Returns whether the player changed form. Signals are delivered with the
    /// next tick.
    pub fn on_transformation_button_clicked(&mut self) -> bool {
        self.player
            .on_transformation_button_clicked(&mut self.world, self.clock, &mut self.signals)
    }

    /// Advance everything by `dt` seconds and hand back the signals raised
    /// since the previous tick.
    pub fn tick(&mut self, dt: f32) -> Vec<Signal> {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_TIME) } else { 0.0 };
        self.clock = self.clock.advanced(dt);

        self.move_platforms();
        for falling in &mut self.falling {
            falling.step(&mut self.world, dt);
        }

        self.resolve_player_attacks();
        self.resolve_enemy_attacks();
        self.resolve_projectile_attacks();

        self.player
            .tick(&mut self.world, self.clock, &mut self.signals);
        for enemy in &mut self.enemies {
            let mut ctx = EnemyContext {
                world: &mut self.world,
                clock: self.clock,
                signals: &mut self.signals,
                spawner: &mut self.spawner,
            };
            enemy.tick(&mut ctx);
        }

        self.process_spawn_requests();
        for laser in &mut self.lasers {
            laser.tick(&self.world, dt);
        }
        for particle in &mut self.particles {
            particle.tick(&mut self.world, dt);
        }

        self.remove_despawned();
        std::mem::take(&mut self.signals)
    }

    fn move_platforms(&mut self) {
        let mut riders = Riders {
            player: self.player.controller_mut(),
            enemies: &mut self.enemies,
        };
        for platform in &mut self.platforms {
            platform.update(&mut self.world, &mut riders, self.clock);
        }
    }

    /// The active attack volume of the player against every enemy it overlaps.
    fn resolve_player_attacks(&mut self) {
        let Some(area) = self.player.attack_area() else {
            return;
        };
        for enemy in &mut self.enemies {
            if !enemy.accepts_damage() || !area.overlaps(&enemy.body().controller().world_bounds()) {
                continue;
            }
            if !self.player.try_strike(enemy.body().body()) {
                continue;
            }
            let Some(hit) = self.player.on_attack() else {
                continue;
            };
            let mut ctx = EnemyContext {
                world: &mut self.world,
                clock: self.clock,
                signals: &mut self.signals,
                spawner: &mut self.spawner,
            };
            enemy.on_damaged(&hit, &mut ctx);
        }
    }

    /// Enemy bodies touching the player.
    fn resolve_enemy_attacks(&mut self) {
        let bounds = self.player.controller().world_bounds();
        for enemy in &mut self.enemies {
            if !self.player.accepts_damage() {
                return;
            }
            let touching = enemy
                .attack_area()
                .is_some_and(|area| area.overlaps(&bounds));
            if !touching {
                continue;
            }
            let mut ctx = EnemyContext {
                world: &mut self.world,
                clock: self.clock,
                signals: &mut self.signals,
                spawner: &mut self.spawner,
            };
            if let Some(hit) = enemy.on_attack(&mut ctx) {
                self.player
                    .on_damaged(&mut self.world, &hit, &mut self.signals);
            }
        }
    }

    fn resolve_projectile_attacks(&mut self) {
        let target = self.player.body();
        let bounds = self.player.controller().world_bounds();

        for laser in &mut self.lasers {
            if !self.player.accepts_damage() {
                return;
            }
            if !laser.area().is_some_and(|area| area.overlaps(&bounds)) {
                continue;
            }
            if let Some(hit) = laser.on_attack(target) {
                self.player
                    .on_damaged(&mut self.world, &hit, &mut self.signals);
            }
        }

        for particle in &mut self.particles {
            if !self.player.accepts_damage() {
                return;
            }
            if !particle.controller().world_bounds().overlaps(&bounds) {
                continue;
            }
            if let Some(hit) = particle.on_attack() {
                self.signals.push(Signal::Explosion {
                    at: particle.position(),
                });
                self.player
                    .on_damaged(&mut self.world, &hit, &mut self.signals);
            }
        }
    }

    fn process_spawn_requests(&mut self) {
        let reference_speed = self.reference_speed();
        let settings = self.config.controller;
        for request in self.spawner.drain() {
            match request {
                SpawnRequest::Beam {
                    id,
                    origin,
                    heading_right,
                    tuning,
                } => {
                    self.lasers
                        .push(Laser::new(id, origin, heading_right, &tuning, reference_speed, &settings));
                    self.signals.push(Signal::BeamFired {
                        id,
                        damaging: tuning.damaging,
                    });
                }
                SpawnRequest::Particles {
                    origin,
                    heading_right,
                    count,
                    tuning,
                } => {
                    for _ in 0..count {
                        match Particle::new(
                            &mut self.world,
                            origin,
                            heading_right,
                            &tuning,
                            reference_speed,
                            settings,
                            &mut self.rng,
                        ) {
                            Ok(particle) => self.particles.push(particle),
                            Err(err) => {
                                log::warn!("particle rejected: {err}");
                                break;
                            }
                        }
                    }
                }
                SpawnRequest::Stop(id) => match self.lasers.iter_mut().find(|laser| laser.id() == id) {
                    Some(laser) => laser.stop(),
                    None => log::warn!("stop requested for unknown beam {id:?}"),
                },
            }
        }
    }

    fn remove_despawned(&mut self) {
        let signals = &mut self.signals;
        let world = &mut self.world;

        self.enemies.retain(|enemy| {
            if !enemy.is_despawned() {
                return true;
            }
            let body = enemy.body().body();
            world.remove(body);
            signals.push(Signal::Despawned(body));
            false
        });

        self.lasers.retain(|laser| {
            if !laser.is_spent() {
                return true;
            }
            signals.push(Signal::BeamRetracted(laser.id()));
            false
        });

        let (spent, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.particles)
            .into_iter()
            .partition(Particle::is_spent);
        self.particles = alive;
        for particle in spent {
            signals.push(Signal::Despawned(particle.body()));
            particle.despawn(world);
        }
    }
}
