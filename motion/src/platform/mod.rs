//! Moving platforms: an eased waypoint route plus passenger transport.

pub mod path;
pub mod transport;

pub use path::{PlatformConfig, WaypointPath, ease};
pub use transport::{MovingPlatform, PassengerMovement, PassengerRegistry};
