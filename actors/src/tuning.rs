//! Designer-facing tunables.
//!
//! Every struct deserializes from partial data (`#[serde(default)]`) and the
//! defaults are the values the game ships with.

use motion::{BodyBounds, ConfigError, ControllerSettings, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("cancelable special action window ({cancelable}s) exceeds the total window ({total}s)")]
    CancelableExceedsTotal { cancelable: f32, total: f32 },
    #[error("`{0}` must be positive")]
    NonPositive(&'static str),
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
    #[error("{0}: minimum exceeds maximum")]
    InvertedRange(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn positive(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive(name))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Negative(name))
    }
}

fn valid_bounds(settings: &ControllerSettings, bounds: &BodyBounds) -> Result<(), TuningError> {
    settings.validate_extents(bounds.half_extents)?;
    Ok(())
}

fn bounds(offset: (f32, f32), half_extents: (f32, f32)) -> BodyBounds {
    BodyBounds {
        offset: Vec2::new(offset.0, offset.1),
        half_extents: Vec2::new(half_extents.0, half_extents.1),
    }
}

/// Attack volumes of the small form, relative to the player position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JuliaVolumes {
    pub jump_down: BodyBounds,
    pub rolling: BodyBounds,
}

impl Default for JuliaVolumes {
    fn default() -> Self {
        Self {
            jump_down: bounds((0.0, -1.5), (0.9, 0.4)),
            rolling: bounds((0.0, 0.0), (1.2, 1.6)),
        }
    }
}

/// Attack volumes of the large form, relative to the player position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JuliettVolumes {
    pub attacks: [BodyBounds; 4],
    pub uppercut: BodyBounds,
}

impl Default for JuliettVolumes {
    fn default() -> Self {
        Self {
            attacks: [
                bounds((2.0, 1.0), (1.5, 1.5)),
                bounds((2.0, 1.0), (1.5, 1.5)),
                bounds((2.5, 1.0), (2.0, 1.5)),
                bounds((2.5, 1.0), (2.0, 1.5)),
            ],
            uppercut: bounds((1.5, 2.5), (1.5, 2.5)),
        }
    }
}

/// Both player forms and the health they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    /// Knockback received when an attacker gives none.
    pub knockback: Vec2,
    pub knockback_time: f32,

    pub total_special_action_available_time: f32,
    pub cancelable_special_action_available_time: f32,
    pub transformation_delay_time: f32,
    pub damage_ignore_duration_after_hit: f32,

    pub max_jump_height: f32,
    pub min_jump_height: f32,
    pub floating_time: f32,
    pub acceleration_time_airborne: f32,
    pub acceleration_time_grounded: f32,

    pub julia_move_speed: f32,
    pub super_jump_multiplier: f32,
    pub wall_jump: Vec2,
    pub wall_gravity_ratio: f32,

    pub juliett_move_speed: f32,
    pub uppercut_duration: f32,
    pub attack_interval: [f32; 4],
    pub acceleration_on_attack: [Vec2; 4],
    pub enemy_knockback_on_uppercut: Vec2,
    pub enemy_knockback_on_attack: [Vec2; 4],

    pub julia_bounds: BodyBounds,
    pub juliett_bounds: BodyBounds,
    /// Shrink applied to the large form's box (full size, not half) when
    /// checking there is room to transform.
    pub transform_room_shrink: Vec2,
    pub julia_volumes: JuliaVolumes,
    pub juliett_volumes: JuliettVolumes,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 6,
            knockback: Vec2::new(50.0, 15.0),
            knockback_time: 0.3,

            total_special_action_available_time: 0.5,
            cancelable_special_action_available_time: 0.3,
            transformation_delay_time: 0.2,
            damage_ignore_duration_after_hit: 1.0,

            max_jump_height: 15.0,
            min_jump_height: 4.0,
            floating_time: 0.8,
            acceleration_time_airborne: 0.2,
            acceleration_time_grounded: 0.1,

            julia_move_speed: 25.0,
            super_jump_multiplier: 1.5,
            wall_jump: Vec2::new(70.0, 70.0),
            wall_gravity_ratio: 0.3,

            juliett_move_speed: 33.0,
            uppercut_duration: 0.5,
            attack_interval: [0.3, 0.4, 0.6, 0.6],
            acceleration_on_attack: [
                Vec2::zeros(),
                Vec2::zeros(),
                Vec2::new(60.0, 0.0),
                Vec2::new(100.0, 0.0),
            ],
            enemy_knockback_on_uppercut: Vec2::new(20.0, 100.0),
            enemy_knockback_on_attack: [
                Vec2::new(15.0, 12.0),
                Vec2::new(20.0, 12.0),
                Vec2::new(60.0, 12.0),
                Vec2::new(110.0, 15.0),
            ],

            julia_bounds: bounds((0.0, 0.0), (1.0, 1.5)),
            juliett_bounds: bounds((0.0, 1.0), (1.5, 2.5)),
            transform_room_shrink: Vec2::new(0.1, 0.1),
            julia_volumes: JuliaVolumes::default(),
            juliett_volumes: JuliettVolumes::default(),
        }
    }
}

impl PlayerTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        if self.max_health <= 0 {
            return Err(TuningError::NonPositive("max_health"));
        }
        if self.cancelable_special_action_available_time > self.total_special_action_available_time {
            return Err(TuningError::CancelableExceedsTotal {
                cancelable: self.cancelable_special_action_available_time,
                total: self.total_special_action_available_time,
            });
        }
        non_negative(
            "cancelable_special_action_available_time",
            self.cancelable_special_action_available_time,
        )?;
        non_negative("knockback_time", self.knockback_time)?;
        non_negative("transformation_delay_time", self.transformation_delay_time)?;
        non_negative("damage_ignore_duration_after_hit", self.damage_ignore_duration_after_hit)?;
        positive("max_jump_height", self.max_jump_height)?;
        positive("min_jump_height", self.min_jump_height)?;
        if self.min_jump_height > self.max_jump_height {
            return Err(TuningError::InvertedRange("jump height"));
        }
        positive("floating_time", self.floating_time)?;
        positive("wall_gravity_ratio", self.wall_gravity_ratio)?;
        non_negative("julia_move_speed", self.julia_move_speed)?;
        non_negative("juliett_move_speed", self.juliett_move_speed)?;
        non_negative("uppercut_duration", self.uppercut_duration)?;
        for interval in self.attack_interval {
            non_negative("attack_interval", interval)?;
        }

        valid_bounds(settings, &self.julia_bounds)?;
        valid_bounds(settings, &self.juliett_bounds)?;
        Ok(())
    }
}

/// Values shared by every enemy body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub health: i32,
    pub acceleration_time_grounded: f32,
    pub acceleration_time_airborne: f32,
    pub gravity: f32,
    pub default_knockback: Vec2,
    /// Max speed as a multiple of the reference (small form) move speed.
    pub speed_relative_to_reference: f32,
    pub bounds: BodyBounds,
    /// Contact attack volume relative to the enemy position.
    pub attack_volume: BodyBounds,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            health: 6,
            acceleration_time_grounded: 0.1,
            acceleration_time_airborne: 0.2,
            gravity: -150.0,
            default_knockback: Vec2::new(45.0, 12.0),
            speed_relative_to_reference: 1.0,
            bounds: bounds((0.0, 0.0), (1.5, 1.5)),
            attack_volume: bounds((0.0, 0.0), (1.4, 1.4)),
        }
    }
}

impl EnemyTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        if self.health <= 0 {
            return Err(TuningError::NonPositive("health"));
        }
        non_negative("speed_relative_to_reference", self.speed_relative_to_reference)?;
        valid_bounds(settings, &self.bounds)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolTuning {
    pub enemy: EnemyTuning,
    pub alert_speed_multiplier: f32,
    pub move_back_after_attack: Vec2,
    pub delay_on_alert: f32,
    pub delay_after_attack: f32,
    pub delay_after_hit: f32,
    pub search_duration: f32,
    pub player_detector: BodyBounds,
}

impl Default for PatrolTuning {
    fn default() -> Self {
        Self {
            enemy: EnemyTuning::default(),
            alert_speed_multiplier: 1.3,
            move_back_after_attack: Vec2::new(60.0, 0.0),
            delay_on_alert: 1.0,
            delay_after_attack: 2.0,
            delay_after_hit: 1.0,
            search_duration: 1.0,
            player_detector: bounds((8.0, 0.0), (8.0, 2.0)),
        }
    }
}

impl PatrolTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        self.enemy.validate(settings)?;
        positive("alert_speed_multiplier", self.alert_speed_multiplier)?;
        non_negative("delay_on_alert", self.delay_on_alert)?;
        non_negative("delay_after_attack", self.delay_after_attack)?;
        non_negative("delay_after_hit", self.delay_after_hit)?;
        non_negative("search_duration", self.search_duration)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardTuning {
    pub enemy: EnemyTuning,
    pub back_jump_velocity: Vec2,
    pub near_ready_time: f32,
    pub near_shoot_time: f32,
    pub far_ready_time: f32,
    pub far_shoot_time: f32,
    pub hit_time: f32,
    pub near_shoot_particles: usize,
    pub near_detector: BodyBounds,
    pub far_detector: BodyBounds,
    /// Where beams and particles leave the guard, authored facing right.
    pub muzzle_offset: Vec2,
    pub laser: LaserTuning,
    pub aiming_line: LaserTuning,
    pub particle: ParticleTuning,
}

impl Default for GuardTuning {
    fn default() -> Self {
        Self {
            enemy: EnemyTuning::default(),
            back_jump_velocity: Vec2::new(120.0, 30.0),
            near_ready_time: 0.8,
            near_shoot_time: 0.1,
            far_ready_time: 2.0,
            far_shoot_time: 0.3,
            hit_time: 0.5,
            near_shoot_particles: 10,
            near_detector: bounds((4.0, 0.0), (4.0, 2.0)),
            far_detector: bounds((16.0, 0.0), (16.0, 2.0)),
            muzzle_offset: Vec2::new(1.6, 0.5),
            laser: LaserTuning::default(),
            aiming_line: LaserTuning::aiming_line(),
            particle: ParticleTuning::default(),
        }
    }
}

impl GuardTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        self.enemy.validate(settings)?;
        non_negative("near_ready_time", self.near_ready_time)?;
        non_negative("near_shoot_time", self.near_shoot_time)?;
        non_negative("far_ready_time", self.far_ready_time)?;
        non_negative("far_shoot_time", self.far_shoot_time)?;
        non_negative("hit_time", self.hit_time)?;
        self.laser.validate()?;
        self.aiming_line.validate()?;
        self.particle.validate(settings)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobTuning {
    pub enemy: EnemyTuning,
    pub flinch_duration: f32,
}

impl Default for MobTuning {
    fn default() -> Self {
        Self {
            enemy: EnemyTuning::default(),
            flinch_duration: 0.3,
        }
    }
}

impl MobTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        self.enemy.validate(settings)?;
        non_negative("flinch_duration", self.flinch_duration)
    }
}

/// A beam that grows from the muzzle. The aiming line is the same beam
/// without damage and without a length cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    pub speed_relative_to_reference: f32,
    pub maximum_length: Option<f32>,
    pub half_thickness: f32,
    pub damaging: bool,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            speed_relative_to_reference: 5.0,
            maximum_length: Some(100.0),
            half_thickness: 0.25,
            damaging: true,
        }
    }
}

impl LaserTuning {
    pub fn aiming_line() -> Self {
        Self {
            speed_relative_to_reference: 10.0,
            maximum_length: None,
            half_thickness: 0.05,
            damaging: false,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        positive("speed_relative_to_reference", self.speed_relative_to_reference)?;
        positive("half_thickness", self.half_thickness)?;
        if let Some(max) = self.maximum_length {
            positive("maximum_length", max)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    /// Launch angle range in degrees, 0 is forward and -90 straight down.
    pub angle_range: (f32, f32),
    /// Launch speed range as multiples of the reference move speed.
    pub speed_range: (f32, f32),
    pub remaining_time: f32,
    pub attackable_time: f32,
    pub half_extents: Vec2,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            angle_range: (-90.0, 0.0),
            speed_range: (1.0, 5.0),
            remaining_time: 2.0,
            attackable_time: 1.5,
            half_extents: Vec2::new(0.25, 0.25),
        }
    }
}

impl ParticleTuning {
    pub fn validate(&self, settings: &ControllerSettings) -> Result<(), TuningError> {
        if self.angle_range.0 > self.angle_range.1 {
            return Err(TuningError::InvertedRange("angle_range"));
        }
        if self.speed_range.0 > self.speed_range.1 {
            return Err(TuningError::InvertedRange("speed_range"));
        }
        positive("remaining_time", self.remaining_time)?;
        non_negative("attackable_time", self.attackable_time)?;
        settings.validate_extents(self.half_extents)?;
        Ok(())
    }
}
