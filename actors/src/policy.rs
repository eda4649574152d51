//! Velocity policies. Pure functions over scalars and vectors; the actors
//! decide when to call them.

use motion::Vec2;

/// Critically damped approach of `current` towards `target`.
///
/// `velocity` carries the rate of change between calls. Never overshoots
/// the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

pub fn apply_gravity(velocity_y: f32, gravity: f32, dt: f32) -> f32 {
    velocity_y + gravity * dt
}

/// `velocity` is in the body's local frame: positive x is forward. The
/// receiver already faces the attacker, so knockback pushes it backwards.
pub fn apply_knockback(velocity: Vec2, knockback: Vec2) -> Vec2 {
    Vec2::new(velocity.x - knockback.x, velocity.y + knockback.y)
}

/// Horizontal target speed in the local frame.
pub fn horizontal_target(input: f32, move_speed: f32, heading_right: bool, enabled: bool) -> f32 {
    if !enabled {
        return 0.0;
    }
    let direction = if heading_right { 1.0 } else { -1.0 };
    direction * input * move_speed
}

/// Gravity and jump impulses derived from the jump arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpPhysics {
    pub gravity: f32,
    pub max_jump_velocity: f32,
    pub min_jump_velocity: f32,
}

impl JumpPhysics {
    pub fn from_heights(max_jump_height: f32, min_jump_height: f32, floating_time: f32) -> Self {
        let gravity = -(8.0 * max_jump_height) / (floating_time * floating_time);
        Self {
            gravity,
            max_jump_velocity: gravity.abs() * (floating_time / 2.0),
            min_jump_velocity: (2.0 * gravity.abs() * min_jump_height).sqrt(),
        }
    }
}
