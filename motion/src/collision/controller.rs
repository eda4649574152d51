use crate::constants::{minimal_probe_length, sign_or_positive};
use crate::error::ConfigError;
use crate::layers::{Layer, LayerMask};

use super::{
    contacts::CollisionInfo,
    probe::CollisionProbe,
    settings::ControllerSettings,
    types::{Aabb, BodyBounds, BodyId, Space, Vec2},
    world::CollisionWorld,
};

/// Ray-sweep motion resolver for one axis-aligned body.
///
/// A controller owns its body's collider in the [`CollisionWorld`] and is the
/// only thing that moves it. Each [`move_by`](Controller::move_by):
/// - recomputes the probe from the current box,
/// - clips the horizontal component against the first hit (minus skin),
/// - clips the vertical component the same way, from origins shifted by the
///   already-clipped horizontal move,
/// - translates the body and reports which sides touched what.
///
/// Displacements are usually given in the body's local frame, where positive x
/// points the way the body faces.
#[derive(Clone, Debug)]
pub struct Controller {
    body: BodyId,
    layer: Layer,
    bounds: BodyBounds,
    position: Vec2,
    heading_right: bool,
    collision_mask: LayerMask,
    settings: ControllerSettings,
    probe: CollisionProbe,
    collisions: CollisionInfo,
}

impl Controller {
    /// Register a new body in `world` and build its controller, facing right.
    pub fn new(
        world: &mut CollisionWorld,
        layer: Layer,
        position: Vec2,
        bounds: BodyBounds,
        collision_mask: LayerMask,
        settings: ControllerSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        settings.validate_extents(bounds.half_extents)?;
        if collision_mask.is_empty() {
            return Err(ConfigError::EmptyCollisionMask);
        }
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(ConfigError::NotFinite("position"));
        }

        let aabb = bounds.world(position, 1.0);
        let body = world.insert(layer, aabb);
        Ok(Self {
            body,
            layer,
            bounds,
            position,
            heading_right: true,
            collision_mask,
            settings,
            probe: CollisionProbe::from_bounds(&aabb, &settings),
            collisions: CollisionInfo::default(),
        })
    }

    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn bounds(&self) -> BodyBounds {
        self.bounds
    }

    #[inline]
    pub fn world_bounds(&self) -> Aabb {
        self.bounds.world(self.position, self.facing())
    }

    #[inline]
    pub fn heading_right(&self) -> bool {
        self.heading_right
    }

    /// +1 when facing right, -1 when facing left.
    #[inline]
    pub fn facing(&self) -> f32 {
        if self.heading_right { 1.0 } else { -1.0 }
    }

    #[inline]
    pub fn collision_mask(&self) -> LayerMask {
        self.collision_mask
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    #[inline]
    pub fn probe(&self) -> &CollisionProbe {
        &self.probe
    }

    /// Contacts of the most recent move.
    #[inline]
    pub fn collisions(&self) -> &CollisionInfo {
        &self.collisions
    }

    /// Convert a world-space vector to this body's local frame (and back; the map is its own inverse).
    #[inline]
    pub fn to_local(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.facing(), v.y)
    }

    /// Move by `displacement`, clipped so the body never passes through
    /// anything in its collision mask.
    pub fn move_by(&mut self, world: &mut CollisionWorld, displacement: Vec2, space: Space) -> CollisionInfo {
        debug_assert!(
            displacement.x.is_finite() && displacement.y.is_finite(),
            "non-finite displacement {displacement:?}"
        );

        let mut move_amount = match space {
            Space::Local => displacement,
            Space::World => self.to_local(displacement),
        };

        self.probe.recompute(&self.world_bounds(), &self.settings);
        self.collisions.reset();
        self.collisions.move_amount_old = move_amount;

        self.horizontal_collisions(world, &mut move_amount);
        if move_amount.y != 0.0 {
            self.vertical_collisions(world, &mut move_amount);
        } else {
            self.resting_probe(world, move_amount.x);
        }

        let delta = self.to_local(move_amount);
        self.position += delta;
        world.translate(self.body, delta);
        self.collisions
    }

    fn horizontal_collisions(&mut self, world: &CollisionWorld, move_amount: &mut Vec2) {
        let skin = self.settings.skin_width;
        let local_sign = sign_or_positive(move_amount.x);
        let direction_x = self.facing() * local_sign;
        let ray_dir = Vec2::new(direction_x, 0.0);
        let mut ray_length = if move_amount.x.abs() < skin {
            minimal_probe_length(skin)
        } else {
            move_amount.x.abs() + skin
        };

        for i in 0..self.probe.horizontal_ray_count {
            let origin = self.probe.horizontal_origin(direction_x, i);
            let Some(hit) = world.raycast(origin, ray_dir, ray_length, self.collision_mask, Some(self.body)) else {
                continue;
            };
            log::trace!("{:?} horizontal ray {i} hit {:?} at {}", self.body, hit.body, hit.distance);

            let touching = hit.distance <= skin;
            if touching {
                move_amount.x = 0.0;
            } else {
                // Never move further than asked, even when probing with the minimal length.
                move_amount.x = local_sign * move_amount.x.abs().min(hit.distance - skin);
                ray_length = hit.distance;
            }

            if self.collisions.move_amount_old.x >= 0.0 {
                self.collisions.front.add(hit.layer);
            } else {
                self.collisions.back.add(hit.layer);
            }

            if touching {
                break;
            }
        }
    }

    fn vertical_collisions(&mut self, world: &CollisionWorld, move_amount: &mut Vec2) {
        let skin = self.settings.skin_width;
        let direction_y = sign_or_positive(move_amount.y);
        let ray_dir = Vec2::new(0.0, direction_y);
        let offset = Vec2::new(move_amount.x * self.facing(), 0.0);
        let mut ray_length = move_amount.y.abs() + skin;

        for i in 0..self.probe.vertical_ray_count {
            let origin = self.probe.vertical_origin(direction_y, i) + offset;
            let Some(hit) = world.raycast(origin, ray_dir, ray_length, self.collision_mask, Some(self.body)) else {
                continue;
            };
            log::trace!("{:?} vertical ray {i} hit {:?} at {}", self.body, hit.body, hit.distance);

            let touching = hit.distance <= skin;
            if touching {
                move_amount.y = 0.0;
            } else {
                move_amount.y = direction_y * (hit.distance - skin);
                ray_length = hit.distance;
            }

            if direction_y < 0.0 {
                self.collisions.below.add(hit.layer);
                self.collisions.below_normal = hit.normal;
            } else {
                self.collisions.above.add(hit.layer);
            }

            if touching {
                break;
            }
        }
    }

    /// Short downward probe for moves without a vertical component, so a body
    /// standing still still knows what it stands on.
    fn resting_probe(&mut self, world: &CollisionWorld, local_dx: f32) {
        let ray_length = minimal_probe_length(self.settings.skin_width);
        let ray_dir = Vec2::new(0.0, -1.0);
        let offset = Vec2::new(local_dx * self.facing(), 0.0);

        for i in 0..self.probe.vertical_ray_count {
            let origin = self.probe.vertical_origin(-1.0, i) + offset;
            if let Some(hit) = world.raycast(origin, ray_dir, ray_length, self.collision_mask, Some(self.body)) {
                self.collisions.below.add(hit.layer);
                self.collisions.below_normal = hit.normal;
            }
        }
    }

    /// Turn around: toggles facing, swaps front/back contacts and mirrors the body offset.
    pub fn flip(&mut self, world: &mut CollisionWorld) {
        self.heading_right = !self.heading_right;
        self.collisions.swap_front_back();
        world.set_aabb(self.body, self.world_bounds());
    }

    /// Face right or left, flipping only when needed.
    pub fn set_heading_right(&mut self, world: &mut CollisionWorld, heading_right: bool) {
        if self.heading_right != heading_right {
            self.flip(world);
        }
    }

    /// Swap the body box (e.g. on a form change). The position is kept.
    pub fn resize(&mut self, world: &mut CollisionWorld, bounds: BodyBounds) -> Result<(), ConfigError> {
        self.settings.validate_extents(bounds.half_extents)?;
        self.bounds = bounds;
        let aabb = self.world_bounds();
        world.set_aabb(self.body, aabb);
        self.probe.recompute(&aabb, &self.settings);
        Ok(())
    }

    /// Place the body without collision checks (spawning, respawning).
    pub fn teleport(&mut self, world: &mut CollisionWorld, position: Vec2) {
        self.position = position;
        world.set_aabb(self.body, self.world_bounds());
    }

    /// Unregister the body from `world`.
    pub fn despawn(self, world: &mut CollisionWorld) {
        world.remove(self.body);
    }
}
