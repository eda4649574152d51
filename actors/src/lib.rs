/*!
Actor behavior on top of [`motion`].

Every actor runs a priority state machine: each tick the candidates from
input, from the environment (contacts, timers, sensors) and from queued
events are reduced to the highest one, at most one transition fires, and the
state's velocity policy is handed to the actor's [`motion::Controller`].

- [`state_machine`]: ordered states, pending requests, the generic driver
- [`player`]: one body with two forms that swap on demand
- [`enemy`]: patrols, guards and mobs
- [`projectile`]: lasers and particle bursts fired by guards
- [`combat`]: hits, attack volumes, target sensors
- [`kinematics`], [`policy`]: velocity integration and smoothing
- [`tuning`]: data-driven tunables with validation
- [`simulation`]: composition root and per-tick ordering
*/

pub mod combat;
pub mod enemy;
pub mod kinematics;
pub mod player;
pub mod policy;
pub mod projectile;
pub mod signal;
pub mod simulation;
pub mod state_machine;
pub mod tuning;

pub use combat::{AttackSource, Hit, HitVolume, TargetDetector};
pub use enemy::{Enemy, EnemyBody, EnemyKind, Guard, GuardState, Mob, MobState, Patrol, PatrolState};
pub use player::{Player, PlayerState};
pub use projectile::{Laser, Particle, ProjectileId};
pub use signal::Signal;
pub use simulation::{MAX_FRAME_TIME, Simulation, SimulationConfig};
pub use state_machine::{ActorState, StateMachine, StateRules, Transition, update_state};
pub use tuning::{
    EnemyTuning, GuardTuning, LaserTuning, MobTuning, ParticleTuning, PatrolTuning, PlayerTuning, TuningError,
};
