//! Large form: a four-hit ground combo and an uppercut.

use motion::{Aabb, CollisionWorld, Controller, Vec2};

use super::form::{FormBase, FormContext, PlayerForm, PlayerState};
use crate::{combat::HitVolume, signal::Signal, tuning::PlayerTuning};

#[derive(Clone, Debug)]
pub struct Juliett {
    /// Set by the action button during Attack1..3; chains into the next hit.
    attack_continue: bool,
    attack_volumes: [HitVolume; 4],
    uppercut_volume: HitVolume,
}

impl Juliett {
    pub fn new(tuning: &PlayerTuning) -> Self {
        let volumes = &tuning.juliett_volumes;
        Self {
            attack_continue: false,
            attack_volumes: volumes.attacks.map(|bounds| HitVolume::new(bounds, true)),
            uppercut_volume: HitVolume::new(volumes.uppercut, true),
        }
    }

    pub fn attack_continue(&self) -> bool {
        self.attack_continue
    }
}

impl PlayerForm for Juliett {
    const NAME: &'static str = "Juliett";

    fn on_action_button(&mut self, state: PlayerState) -> PlayerState {
        match state {
            PlayerState::Idle | PlayerState::Walking => PlayerState::Attack1,
            PlayerState::Attack1 | PlayerState::Attack2 | PlayerState::Attack3 => {
                self.attack_continue = true;
                PlayerState::None
            }
            PlayerState::SpecialActionReady | PlayerState::CancelableSpecialActionReady => PlayerState::Uppercut,
            _ => PlayerState::None,
        }
    }

    fn next_state_from_environment(
        &self,
        base: &FormBase,
        state: PlayerState,
        ctx: &FormContext<'_>,
    ) -> Option<PlayerState> {
        let timer_running = base.machine.timer_running(ctx.clock.now);
        let next = match state {
            PlayerState::Attack1 | PlayerState::Attack2 | PlayerState::Attack3 if timer_running => state,
            PlayerState::Attack1 if self.attack_continue => PlayerState::Attack2,
            PlayerState::Attack2 if self.attack_continue => PlayerState::Attack3,
            PlayerState::Attack3 if self.attack_continue => PlayerState::Attack4,
            PlayerState::Attack1 | PlayerState::Attack2 | PlayerState::Attack3 => PlayerState::Idle,
            PlayerState::Attack4 | PlayerState::Uppercut if timer_running => state,
            PlayerState::Attack4 | PlayerState::Uppercut => PlayerState::Idle,
            _ => return None,
        };
        Some(next)
    }

    fn exit_state(&mut self, base: &mut FormBase, from: PlayerState, _to: PlayerState, _ctx: &mut FormContext<'_>) {
        if let Some(index) = from.attack_index() {
            self.attack_continue = false;
            base.horizontal_movement_enabled = true;
            self.attack_volumes[index].set_active(false);
        } else if from == PlayerState::Uppercut {
            base.horizontal_movement_enabled = true;
            self.uppercut_volume.set_active(false);
        }
    }

    fn enter_state(&mut self, base: &mut FormBase, _from: PlayerState, to: PlayerState, ctx: &mut FormContext<'_>) {
        let heading_right = ctx.controller.heading_right();
        if let Some(index) = to.attack_index() {
            base.machine
                .start_timer(ctx.clock.now, ctx.tuning.attack_interval[index]);
            base.kinematics.velocity += ctx.tuning.acceleration_on_attack[index];
            base.horizontal_movement_enabled = false;
            self.attack_volumes[index].set_active(true);
            ctx.signals.push(Signal::AttackEffect {
                combo: index,
                heading_right,
            });
        } else if to == PlayerState::Uppercut {
            base.machine
                .start_timer(ctx.clock.now, ctx.tuning.uppercut_duration);
            base.horizontal_movement_enabled = false;
            self.uppercut_volume.set_active(true);
            ctx.signals.push(Signal::UppercutEffect { heading_right });
        }
    }

    fn animation_clip(state: PlayerState) -> Option<&'static str> {
        let clip = match state {
            PlayerState::Idle | PlayerState::PostTransformationDelay => "JuliettIdle",
            PlayerState::JumpingDown | PlayerState::SpecialJumpingDown => "JuliettJumpDown",
            PlayerState::Walking => "JuliettWalk",
            PlayerState::Attack1 => "JuliettAttack1",
            PlayerState::Attack2 => "JuliettAttack2",
            PlayerState::Attack3 => "JuliettAttack3",
            PlayerState::Attack4 => "JuliettAttack4",
            PlayerState::SpecialActionReady | PlayerState::CancelableSpecialActionReady => "JuliettUppercutPrepare",
            PlayerState::Uppercut => "JuliettUppercut",
            PlayerState::Hit => "JuliettHit",
            PlayerState::GameOver => "JuliettGameOver",
            _ => return None,
        };
        Some(clip)
    }

    fn on_attack(&mut self, base: &mut FormBase, tuning: &PlayerTuning) -> Option<(i32, Vec2)> {
        let state = base.state();
        if let Some(index) = state.attack_index() {
            Some((1, tuning.enemy_knockback_on_attack[index]))
        } else if state == PlayerState::Uppercut {
            Some((1, tuning.enemy_knockback_on_uppercut))
        } else {
            log::warn!("Juliett attack detected in non-attacking state {state:?}");
            None
        }
    }

    fn active_volume(&self) -> Option<&HitVolume> {
        self.attack_volumes
            .iter()
            .chain(std::iter::once(&self.uppercut_volume))
            .find(|v| v.is_active())
    }

    fn active_volume_mut(&mut self) -> Option<&mut HitVolume> {
        self.attack_volumes
            .iter_mut()
            .chain(std::iter::once(&mut self.uppercut_volume))
            .find(|v| v.is_active())
    }

    /// The large box, slightly shrunk, must not overlap any collidable.
    fn has_room(&self, world: &CollisionWorld, controller: &Controller, tuning: &PlayerTuning) -> bool {
        let full = tuning
            .juliett_bounds
            .world(controller.position(), controller.facing());
        let area = Aabb::new(full.center, full.half_extents - tuning.transform_room_shrink / 2.0);
        world
            .overlap_box(&area, controller.collision_mask(), Some(controller.body()))
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_button_chains_combo() {
        let mut juliett = Juliett::new(&PlayerTuning::default());
        assert_eq!(juliett.on_action_button(PlayerState::Walking), PlayerState::Attack1);
        assert!(!juliett.attack_continue());
        assert_eq!(juliett.on_action_button(PlayerState::Attack2), PlayerState::None);
        assert!(juliett.attack_continue());
        // The last hit cannot be chained.
        let mut fresh = Juliett::new(&PlayerTuning::default());
        assert_eq!(fresh.on_action_button(PlayerState::Attack4), PlayerState::None);
        assert!(!fresh.attack_continue());
        assert_eq!(
            fresh.on_action_button(PlayerState::SpecialActionReady),
            PlayerState::Uppercut
        );
    }

    #[test]
    fn knockback_follows_combo_index() {
        let tuning = PlayerTuning::default();
        let mut juliett = Juliett::new(&tuning);
        let mut base = FormBase::new(&tuning, tuning.juliett_move_speed, PlayerState::Attack3);
        assert_eq!(juliett.on_attack(&mut base, &tuning), Some((1, Vec2::new(60.0, 12.0))));
        let mut base = FormBase::new(&tuning, tuning.juliett_move_speed, PlayerState::Uppercut);
        assert_eq!(juliett.on_attack(&mut base, &tuning), Some((1, Vec2::new(20.0, 100.0))));
        let mut base = FormBase::new(&tuning, tuning.juliett_move_speed, PlayerState::Walking);
        assert_eq!(juliett.on_attack(&mut base, &tuning), None);
    }

    #[test]
    fn room_check_uses_shrunk_box() {
        use motion::{BodyBounds, ControllerSettings, Layer, collidable_mask};

        let tuning = PlayerTuning::default();
        let mut world = CollisionWorld::new();
        let controller = Controller::new(
            &mut world,
            Layer::Player,
            Vec2::zeros(),
            tuning.julia_bounds,
            collidable_mask(),
            ControllerSettings::default(),
        )
        .unwrap();
        let juliett = Juliett::new(&tuning);
        assert!(juliett.has_room(&world, &controller, &tuning));

        // Ceiling touching the large box's top (y = 3.5) still leaves room.
        world.insert(
            Layer::Obstacle,
            Aabb::new(Vec2::new(0.0, 4.0), Vec2::new(5.0, 0.5)),
        );
        assert!(juliett.has_room(&world, &controller, &tuning));

        // A low ceiling does not.
        world.insert(
            Layer::Obstacle,
            Aabb::new(Vec2::new(0.0, 3.0), Vec2::new(5.0, 0.2)),
        );
        assert!(!juliett.has_room(&world, &controller, &tuning));

        // Enemies never block the transformation.
        let mut open = CollisionWorld::new();
        let c = Controller::new(
            &mut open,
            Layer::Player,
            Vec2::zeros(),
            BodyBounds::centered(Vec2::new(1.0, 1.5)),
            collidable_mask(),
            ControllerSettings::default(),
        )
        .unwrap();
        open.insert(Layer::Enemy, Aabb::new(Vec2::new(0.0, 2.0), Vec2::new(1.0, 1.0)));
        assert!(juliett.has_room(&open, &c, &tuning));
    }
}
