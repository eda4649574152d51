//! Small form: jumps, sticks to walls, super-jumps into a rolling attack.

use motion::{Layer, Vec2};

use super::form::{FormBase, FormContext, PlayerForm, PlayerState};
use crate::{combat::HitVolume, signal::Signal, tuning::PlayerTuning};

#[derive(Clone, Debug)]
pub struct Julia {
    jump_down_volume: HitVolume,
    rolling_volume: HitVolume,
}

impl Julia {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            jump_down_volume: HitVolume::new(tuning.julia_volumes.jump_down, true),
            rolling_volume: HitVolume::new(tuning.julia_volumes.rolling, true),
        }
    }

    fn wall_jump(base: &mut FormBase, ctx: &mut FormContext<'_>) {
        base.kinematics.velocity = Vec2::new(-ctx.tuning.wall_jump.x, ctx.tuning.wall_jump.y);
        let heading_right = !ctx.controller.heading_right();
        base.set_heading_right(ctx, heading_right);
    }
}

impl PlayerForm for Julia {
    const NAME: &'static str = "Julia";

    fn on_action_button(&mut self, state: PlayerState) -> PlayerState {
        match state {
            PlayerState::Idle | PlayerState::Walking | PlayerState::WallStick => PlayerState::JumpingUp,
            PlayerState::SpecialActionReady | PlayerState::CancelableSpecialActionReady => PlayerState::SuperJump,
            _ => PlayerState::None,
        }
    }

    fn next_state_from_environment(
        &self,
        base: &FormBase,
        state: PlayerState,
        ctx: &FormContext<'_>,
    ) -> Option<PlayerState> {
        let collisions = ctx.controller.collisions();
        let below = collisions.below.any();
        let wall_in_front = collisions.front.contains(Layer::Obstacle);
        let rising = base.kinematics.velocity.y > 0.0;

        let next = match state {
            PlayerState::JumpingDown | PlayerState::SpecialJumpingDown if !below && wall_in_front => {
                PlayerState::WallStick
            }
            PlayerState::WallStick if below => PlayerState::Idle,
            PlayerState::WallStick if wall_in_front => PlayerState::WallStick,
            PlayerState::WallStick => PlayerState::JumpingDown,
            PlayerState::JumpingUp if rising => PlayerState::JumpingUp,
            PlayerState::JumpingUp => PlayerState::JumpingDown,
            PlayerState::SuperJump if rising => PlayerState::SuperJump,
            PlayerState::SuperJump => PlayerState::Rolling,
            PlayerState::Rolling if below => PlayerState::Idle,
            PlayerState::Rolling if wall_in_front => PlayerState::WallStick,
            PlayerState::Rolling => PlayerState::Rolling,
            _ => return None,
        };
        Some(next)
    }

    fn exit_state(&mut self, base: &mut FormBase, from: PlayerState, _to: PlayerState, ctx: &mut FormContext<'_>) {
        match from {
            PlayerState::JumpingDown => self.jump_down_volume.set_active(false),
            PlayerState::WallStick => {
                base.horizontal_movement_enabled = true;
                base.gravity /= ctx.tuning.wall_gravity_ratio;
            }
            PlayerState::Rolling => {
                self.rolling_volume.set_active(false);
                ctx.signals.push(Signal::RollingEffects(false));
            }
            _ => {}
        }
    }

    fn enter_state(&mut self, base: &mut FormBase, from: PlayerState, to: PlayerState, ctx: &mut FormContext<'_>) {
        match to {
            PlayerState::JumpingDown => self.jump_down_volume.set_active(true),
            PlayerState::WallStick => {
                base.horizontal_movement_enabled = false;
                base.kinematics.velocity.y = 0.0;
                base.gravity *= ctx.tuning.wall_gravity_ratio;
            }
            PlayerState::JumpingUp if from == PlayerState::WallStick => Self::wall_jump(base, ctx),
            PlayerState::JumpingUp => base.kinematics.velocity.y = base.jump.max_jump_velocity,
            PlayerState::Rolling => {
                self.rolling_volume.set_active(true);
                ctx.signals.push(Signal::RollingEffects(true));
            }
            PlayerState::SuperJump => {
                base.kinematics.velocity.y = base.jump.max_jump_velocity * ctx.tuning.super_jump_multiplier;
            }
            _ => {}
        }
    }

    fn animation_clip(state: PlayerState) -> Option<&'static str> {
        let clip = match state {
            PlayerState::Idle | PlayerState::PostTransformationDelay => "JuliaIdle",
            PlayerState::JumpingUp => "JuliaJumpUp",
            PlayerState::JumpingDown | PlayerState::SpecialJumpingDown => "JuliaJumpDownPrepare",
            PlayerState::Walking => "JuliaWalk",
            PlayerState::SpecialActionReady | PlayerState::CancelableSpecialActionReady => "JuliaSuperJumpPrepare",
            PlayerState::SuperJump => "JuliaSuperJump",
            PlayerState::Rolling => "JuliaRolling",
            PlayerState::WallStick => "JuliaWallStick",
            PlayerState::Hit => "JuliaHit",
            PlayerState::GameOver => "JuliaGameOver",
            _ => return None,
        };
        Some(clip)
    }

    fn on_attack(&mut self, base: &mut FormBase, _tuning: &PlayerTuning) -> Option<(i32, Vec2)> {
        match base.state() {
            PlayerState::JumpingDown | PlayerState::Rolling => {
                base.machine.request(PlayerState::JumpingUp);
                Some((1, Vec2::zeros()))
            }
            other => {
                log::warn!("Julia attack detected in non-attacking state {other:?}");
                None
            }
        }
    }

    fn active_volume(&self) -> Option<&HitVolume> {
        [&self.jump_down_volume, &self.rolling_volume]
            .into_iter()
            .find(|v| v.is_active())
    }

    fn active_volume_mut(&mut self) -> Option<&mut HitVolume> {
        [&mut self.jump_down_volume, &mut self.rolling_volume]
            .into_iter()
            .find(|v| v.is_active())
    }
}
