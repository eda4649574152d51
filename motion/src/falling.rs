//! Loose obstacles that drop under gravity until they rest on something.

use serde::{Deserialize, Serialize};

use crate::collision::types::{Aabb, BodyId, Vec2};
use crate::collision::world::CollisionWorld;
use crate::constants::DIST_EPS;
use crate::error::ConfigError;
use crate::layers::{Layer, LayerMask, collidable_mask};

/// Rays along the bottom edge: both corners and the middle.
const RAY_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallingBodyConfig {
    /// Must be negative.
    pub gravity: f32,
    pub collision_mask: LayerMask,
}

impl Default for FallingBodyConfig {
    fn default() -> Self {
        Self {
            gravity: -150.0,
            collision_mask: collidable_mask(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FallingBody {
    body: BodyId,
    aabb: Aabb,
    speed: f32,
    config: FallingBodyConfig,
}

impl FallingBody {
    pub fn new(world: &mut CollisionWorld, layer: Layer, aabb: Aabb, config: FallingBodyConfig) -> Result<Self, ConfigError> {
        if !aabb.is_valid() {
            return Err(ConfigError::NonPositiveExtents(aabb.half_extents));
        }
        if config.collision_mask.is_empty() {
            return Err(ConfigError::EmptyCollisionMask);
        }
        if config.gravity > 0.0 {
            log::error!("falling body gravity must be negative, got {}", config.gravity);
        }
        let body = world.insert(layer, aabb);
        Ok(Self {
            body,
            aabb,
            speed: 0.0,
            config,
        })
    }

    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Advance one frame. Returns `true` while resting on something.
    pub fn step(&mut self, world: &mut CollisionWorld, dt: f32) -> bool {
        let mut distance = (self.speed * dt).abs();
        let bottom_left = self.aabb.min();
        let spacing = self.aabb.size().x / (RAY_COUNT - 1) as f32;

        for i in 0..RAY_COUNT {
            let origin = bottom_left + Vec2::new(spacing * i as f32, 0.0);
            for hit in world.raycast_all(origin, Vec2::new(0.0, -1.0), distance, self.config.collision_mask, Some(self.body)) {
                if hit.distance <= DIST_EPS {
                    self.speed = 0.0;
                    return true;
                }
                distance = distance.min(hit.distance);
            }
        }

        let delta = Vec2::new(0.0, -distance);
        self.aabb = self.aabb.translated(delta);
        world.translate(self.body, delta);
        self.speed += self.config.gravity * dt;
        false
    }
}
