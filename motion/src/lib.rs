/*!
Kinematic motion for side-view actors.

Every moving body is an axis-aligned box that is never simulated as a rigid
body: callers hand a [`Controller`] the displacement they want for this frame
and get back the displacement that is actually safe, together with the sides
that touched something.

- [`collision`]: world, probe, ray-sweep controller
- [`platform`]: waypoint-following platforms that carry passengers
- [`beam`]: growing beams clipped by geometry
- [`falling`]: loose obstacles dropping under gravity
- [`layers`], [`bitmask_flags`]: collision layers and masks
*/

pub mod beam;
pub mod bitmask_flags;
pub mod collision;
pub mod constants;
pub mod error;
pub mod falling;
pub mod layers;
pub mod platform;

pub use beam::Beam;
pub use bitmask_flags::{BitmaskFlags, FlagBitmask};
pub use collision::{
    Aabb, BodyBounds, BodyId, CollisionInfo, CollisionWorld, Contacts, Controller, ControllerSettings, FrameTime,
    RayHit, Space, Vec2,
};
pub use constants::{DISTANCE_BETWEEN_RAYS, SKIN_WIDTH};
pub use error::ConfigError;
pub use falling::{FallingBody, FallingBodyConfig};
pub use layers::{Layer, LayerMask, collidable_mask, passenger_mask};
pub use platform::{MovingPlatform, PassengerRegistry, PlatformConfig, WaypointPath};
