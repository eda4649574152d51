use motion::{BodyId, Vec2};

use crate::projectile::ProjectileId;

/// Outbound notifications for presentation collaborators (animation, UI,
/// effects). The simulation queues them during a tick and the caller drains
/// them afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Animation { body: BodyId, clip: &'static str },
    HealthChanged(i32),
    PlayerDead,
    PlayerTransformed { small_form: bool },
    SpecialActionAvailable(bool),
    /// Half-transparent blinking while damage is ignored.
    DamageBlink(bool),
    RollingEffects(bool),
    AttackEffect { combo: usize, heading_right: bool },
    UppercutEffect { heading_right: bool },
    /// A guard beam appeared; the aiming line is the non-damaging one.
    BeamFired { id: ProjectileId, damaging: bool },
    BeamRetracted(ProjectileId),
    Explosion { at: Vec2 },
    Despawned(BodyId),
}
