use std::collections::BTreeSet;

use crate::collision::{
    controller::Controller,
    probe::CollisionProbe,
    settings::ControllerSettings,
    types::{BodyBounds, BodyId, FrameTime, RayHit, Space, Vec2},
    world::CollisionWorld,
};
use crate::constants::{minimal_probe_length, sign_or_positive};
use crate::error::ConfigError;
use crate::layers::{Layer, LayerMask, passenger_mask};

use super::path::{PlatformConfig, WaypointPath};

/// Lookup from a passenger's body to the controller that moves it.
///
/// Implemented by whoever owns the actors; the platform never owns its riders.
pub trait PassengerRegistry {
    fn passenger_mut(&mut self, body: BodyId) -> Option<&mut Controller>;
}

impl PassengerRegistry for Vec<Controller> {
    fn passenger_mut(&mut self, body: BodyId) -> Option<&mut Controller> {
        self.iter_mut().find(|c| c.body() == body)
    }
}

/// One planned push of a passenger for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassengerMovement {
    pub body: BodyId,
    /// World-space displacement.
    pub velocity: Vec2,
    pub move_before_platform: bool,
}

/// A kinematic platform following a [`WaypointPath`] and transporting passengers.
///
/// The platform itself ignores collisions. Passengers are moved through their
/// own controllers, so they are still stopped by walls.
#[derive(Clone, Debug)]
pub struct MovingPlatform {
    body: BodyId,
    bounds: BodyBounds,
    position: Vec2,
    passenger_mask: LayerMask,
    settings: ControllerSettings,
    probe: CollisionProbe,
    path: WaypointPath,
}

impl MovingPlatform {
    pub fn new(
        world: &mut CollisionWorld,
        position: Vec2,
        bounds: BodyBounds,
        config: &PlatformConfig,
        settings: ControllerSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        settings.validate_extents(bounds.half_extents)?;
        let path = WaypointPath::new(config, position)?;
        let aabb = bounds.world(position, 1.0);
        let body = world.insert(Layer::Platform, aabb);
        Ok(Self {
            body,
            bounds,
            position,
            passenger_mask: passenger_mask(),
            settings,
            probe: CollisionProbe::from_bounds(&aabb, &settings),
            path,
        })
    }

    pub fn with_passenger_mask(mut self, mask: LayerMask) -> Self {
        self.passenger_mask = mask;
        self
    }

    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn path(&self) -> &WaypointPath {
        &self.path
    }

    /// Advance one frame: push passengers in front, move, then carry riders.
    ///
    /// Returns the platform's own displacement.
    pub fn update(
        &mut self,
        world: &mut CollisionWorld,
        passengers: &mut dyn PassengerRegistry,
        clock: FrameTime,
    ) -> Vec2 {
        self.probe
            .recompute(&self.bounds.world(self.position, 1.0), &self.settings);

        let velocity = self.path.advance(clock, self.position);
        let movements = self.calculate_passenger_movement(world, velocity);

        self.move_passengers(world, passengers, &movements, true);
        self.position += velocity;
        world.translate(self.body, velocity);
        self.move_passengers(world, passengers, &movements, false);

        velocity
    }

    fn move_passengers(
        &self,
        world: &mut CollisionWorld,
        passengers: &mut dyn PassengerRegistry,
        movements: &[PassengerMovement],
        before_platform: bool,
    ) {
        for movement in movements.iter().filter(|m| m.move_before_platform == before_platform) {
            match passengers.passenger_mut(movement.body) {
                Some(controller) => {
                    controller.move_by(world, movement.velocity, Space::World);
                }
                None => log::warn!("platform {:?} hit {:?} which has no controller", self.body, movement.body),
            }
        }
    }

    /// Plan this frame's passenger pushes for a platform displacement of `velocity`.
    pub fn calculate_passenger_movement(&self, world: &CollisionWorld, velocity: Vec2) -> Vec<PassengerMovement> {
        let skin = self.settings.skin_width;
        let mut moved: BTreeSet<BodyId> = BTreeSet::new();
        let mut movements = Vec::new();

        let direction_x = sign_or_positive(velocity.x);
        let direction_y = sign_or_positive(velocity.y);

        // Vertically moving platform: whatever sits in the way is pushed along first.
        if velocity.y != 0.0 {
            let ray_length = velocity.y.abs() + skin;
            for i in 0..self.probe.vertical_ray_count {
                let origin = self.probe.vertical_origin(direction_y, i);
                let Some(hit) = self.cast(world, origin, Vec2::new(0.0, direction_y), ray_length) else {
                    continue;
                };
                if moved.insert(hit.body) {
                    let push_x = if direction_y > 0.0 { velocity.x } else { 0.0 };
                    let push_y = velocity.y - (hit.distance - skin) * direction_y;
                    movements.push(PassengerMovement {
                        body: hit.body,
                        velocity: Vec2::new(push_x, push_y),
                        move_before_platform: true,
                    });
                }
            }
        }

        // Horizontally moving platform: bodies in front are shoved and kept grounded.
        if velocity.x != 0.0 {
            let ray_length = velocity.x.abs() + skin;
            for i in 0..self.probe.horizontal_ray_count {
                let origin = self.probe.horizontal_origin(direction_x, i);
                let Some(hit) = self.cast(world, origin, Vec2::new(direction_x, 0.0), ray_length) else {
                    continue;
                };
                if moved.insert(hit.body) {
                    let push_x = velocity.x - (hit.distance - skin) * direction_x;
                    movements.push(PassengerMovement {
                        body: hit.body,
                        velocity: Vec2::new(push_x, -skin),
                        move_before_platform: true,
                    });
                }
            }
        }

        // Riders on top when moving down or sideways: carried after the platform moved.
        if (velocity.y != 0.0 && direction_y < 0.0) || (velocity.y == 0.0 && velocity.x != 0.0) {
            let ray_length = minimal_probe_length(skin);
            for i in 0..self.probe.vertical_ray_count {
                let origin = self.probe.vertical_origin(1.0, i);
                let Some(hit) = self.cast(world, origin, Vec2::new(0.0, 1.0), ray_length) else {
                    continue;
                };
                if moved.insert(hit.body) {
                    movements.push(PassengerMovement {
                        body: hit.body,
                        velocity,
                        move_before_platform: false,
                    });
                }
            }
        }

        movements
    }

    /// Nearest passenger hit, ignoring bodies the ray starts inside.
    fn cast(
        &self,
        world: &CollisionWorld,
        origin: Vec2,
        dir: Vec2,
        ray_length: f32,
    ) -> Option<RayHit> {
        world
            .raycast(origin, dir, ray_length, self.passenger_mask, Some(self.body))
            .filter(|hit| hit.distance != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::Aabb;
    use crate::layers::collidable_mask;

    const DT: f32 = 1.0 / 60.0;

    fn platform(world: &mut CollisionWorld, waypoints: &[(f32, f32)]) -> MovingPlatform {
        let config = PlatformConfig {
            local_waypoints: waypoints.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
            speed: 3.0,
            ..Default::default()
        };
        MovingPlatform::new(
            world,
            Vec2::zeros(),
            BodyBounds::centered(Vec2::new(2.0, 0.25)),
            &config,
            ControllerSettings::default(),
        )
        .unwrap()
    }

    fn rider(world: &mut CollisionWorld, position: Vec2) -> Controller {
        Controller::new(
            world,
            Layer::Player,
            position,
            BodyBounds::centered(Vec2::new(0.5, 0.5)),
            collidable_mask(),
            ControllerSettings::default(),
        )
        .unwrap()
    }

    /// One frame of an actor that only falls, the way every actor ticks after platforms.
    fn settle(world: &mut CollisionWorld, actor: &mut Controller) {
        actor.move_by(world, Vec2::new(0.0, -50.0 * DT * DT), Space::Local);
    }

    fn ride(world: &mut CollisionWorld, plat: &mut MovingPlatform, riders: &mut Vec<Controller>, frames: usize) -> Vec2 {
        let mut total = Vec2::zeros();
        let mut clock = FrameTime::new(0.0, DT);
        for _ in 0..frames {
            clock = clock.advanced(DT);
            total += plat.update(world, riders, clock);
            for actor in riders.iter_mut() {
                settle(world, actor);
            }
        }
        total
    }

    #[test]
    fn rider_follows_horizontal_platform() {
        let mut world = CollisionWorld::new();
        let mut plat = platform(&mut world, &[(0.0, 0.0), (6.0, 0.0)]);
        let mut riders = vec![rider(&mut world, Vec2::new(0.0, 0.75))];

        let start = riders[0].position();
        let moved = ride(&mut world, &mut plat, &mut riders, 60);

        let carried = riders[0].position() - start;
        assert!(moved.x > 1.0);
        assert!((carried.x - moved.x).abs() < 1.0e-3, "rider {carried:?} platform {moved:?}");
        assert!((riders[0].position().y - 0.75).abs() < 1.0e-3);
    }

    #[test]
    fn rider_follows_vertical_platform_both_ways() {
        let mut world = CollisionWorld::new();
        let mut plat = platform(&mut world, &[(0.0, 0.0), (0.0, 3.0)]);
        let mut riders = vec![rider(&mut world, Vec2::new(0.5, 0.75))];

        // One full leg up and most of the way back down.
        ride(&mut world, &mut plat, &mut riders, 60);
        let gap = riders[0].world_bounds().min().y - world.get(plat.body()).unwrap().aabb.max().y;
        assert!(gap.abs() < 1.0e-3, "rider separated going up: {gap}");
        assert!(riders[0].collisions().below.contains(Layer::Platform));

        ride(&mut world, &mut plat, &mut riders, 40);
        let gap = riders[0].world_bounds().min().y - world.get(plat.body()).unwrap().aabb.max().y;
        assert!(gap.abs() < 1.0e-3, "rider separated going down: {gap}");
        assert!(gap > -1.0e-4, "rider sank into the platform: {gap}");
    }

    #[test]
    fn body_in_front_is_pushed_and_kept_grounded() {
        let mut world = CollisionWorld::new();
        let plat = platform(&mut world, &[(0.0, 0.0), (6.0, 0.0)]);
        let pushed = rider(&mut world, Vec2::new(2.6, 0.0));

        let movements = plat.calculate_passenger_movement(&world, Vec2::new(0.2, 0.0));
        assert_eq!(movements.len(), 1);
        let push = movements[0];
        assert_eq!(push.body, pushed.body());
        assert!(push.move_before_platform);
        // 0.1 gap to close, 0.2 platform move.
        assert!((push.velocity.x - 0.1).abs() < 1.0e-4);
        assert!((push.velocity.y + ControllerSettings::default().skin_width).abs() < 1.0e-6);
    }

    #[test]
    fn each_passenger_is_planned_once() {
        let mut world = CollisionWorld::new();
        let plat = platform(&mut world, &[(0.0, 0.0), (0.0, -3.0)]);
        let wide = Controller::new(
            &mut world,
            Layer::Enemy,
            Vec2::new(0.0, 1.25),
            BodyBounds::centered(Vec2::new(1.5, 1.0)),
            collidable_mask(),
            ControllerSettings::default(),
        )
        .unwrap();

        let movements = plat.calculate_passenger_movement(&world, Vec2::new(0.0, -0.1));
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].body, wide.body());
        assert!(!movements[0].move_before_platform);
        assert_eq!(movements[0].velocity, Vec2::new(0.0, -0.1));
    }

    #[test]
    fn bodies_overlapping_the_platform_are_ignored() {
        let mut world = CollisionWorld::new();
        let plat = platform(&mut world, &[(0.0, 0.0), (0.0, 3.0)]);
        // Intersecting the platform: every ray starts inside it.
        world.insert(Layer::Player, Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(3.0, 1.0)));
        assert!(plat.calculate_passenger_movement(&world, Vec2::new(0.0, 0.1)).is_empty());
    }
}
