use motion::{CollisionInfo, CollisionWorld, Controller, Space, Vec2};

use crate::policy::{apply_gravity, apply_knockback, smooth_damp};

/// Local-frame velocity plus the smoothing state of its x component.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    pub velocity: Vec2,
    pub velocity_x_smoothing: f32,
}

/// Horizontal smoothing times, grounded and airborne.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acceleration {
    pub grounded: f32,
    pub airborne: f32,
}

impl Kinematics {
    /// Approach `target_x` horizontally and integrate gravity for one frame.
    pub fn steer(&mut self, target_x: f32, grounded: bool, acceleration: Acceleration, gravity: f32, dt: f32) {
        let smooth_time = if grounded {
            acceleration.grounded
        } else {
            acceleration.airborne
        };
        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            dt,
        );
        self.velocity.y = apply_gravity(self.velocity.y, gravity, dt);
    }

    /// Move by `velocity * dt`; vertical speed is cancelled by a floor or ceiling.
    pub fn step(&mut self, controller: &mut Controller, world: &mut CollisionWorld, dt: f32) -> CollisionInfo {
        let info = controller.move_by(world, self.velocity * dt, Space::Local);
        if info.above.any() || info.below.any() {
            self.velocity.y = 0.0;
        }
        info
    }

    /// Turn the body around, keeping world-space velocity unchanged.
    pub fn flip(&mut self, controller: &mut Controller, world: &mut CollisionWorld) {
        self.velocity.x = -self.velocity.x;
        controller.flip(world);
    }

    pub fn face(&mut self, controller: &mut Controller, world: &mut CollisionWorld, heading_right: bool) {
        if controller.heading_right() != heading_right {
            self.flip(controller, world);
        }
    }

    pub fn knock_back(&mut self, knockback: Vec2) {
        self.velocity = apply_knockback(self.velocity, knockback);
    }
}

#[cfg(test)]
mod tests {
    use motion::{Aabb, BodyBounds, ControllerSettings, Layer, collidable_mask};

    use super::*;

    fn setup() -> (CollisionWorld, Controller) {
        let mut world = CollisionWorld::new();
        world.insert(Layer::Obstacle, Aabb::new(Vec2::new(0.0, -3.0), Vec2::new(50.0, 1.0)));
        let controller = Controller::new(
            &mut world,
            Layer::Enemy,
            Vec2::zeros(),
            BodyBounds::centered(Vec2::new(0.5, 0.5)),
            collidable_mask(),
            ControllerSettings::default(),
        )
        .unwrap();
        (world, controller)
    }

    #[test]
    fn landing_cancels_vertical_speed() {
        let (mut world, mut controller) = setup();
        let mut k = Kinematics {
            velocity: Vec2::new(0.0, -60.0),
            ..Default::default()
        };
        let mut landed = false;
        for _ in 0..30 {
            let info = k.step(&mut controller, &mut world, 1.0 / 60.0);
            if info.below.any() {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(k.velocity.y, 0.0);
    }

    #[test]
    fn flip_preserves_world_velocity() {
        let (mut world, mut controller) = setup();
        let mut k = Kinematics {
            velocity: Vec2::new(5.0, 0.0),
            ..Default::default()
        };
        let before = controller.to_local(k.velocity);
        k.face(&mut controller, &mut world, false);
        assert!(!controller.heading_right());
        assert_eq!(controller.to_local(k.velocity), before);

        // Already facing left: nothing changes.
        k.face(&mut controller, &mut world, false);
        assert_eq!(k.velocity.x, -5.0);
    }

    #[test]
    fn steer_accelerates_towards_target() {
        let mut k = Kinematics::default();
        let acceleration = Acceleration {
            grounded: 0.1,
            airborne: 0.2,
        };
        k.steer(25.0, true, acceleration, -150.0, 1.0 / 60.0);
        assert!(k.velocity.x > 0.0 && k.velocity.x < 25.0);
        assert!((k.velocity.y + 2.5).abs() < 1e-4);
    }
}
