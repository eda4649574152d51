/*!
Collision root module.

Ray-sweep collision for axis-aligned bodies, using parry (through `rapier2d`)
for the narrow-phase ray casts. The code is split for clarity:

- types:        shared data types (Aabb, BodyBounds, RayHit, FrameTime, etc.)
- settings:     skin width and ray spacing
- broad:        ray segment pruning
- narrow_phase: thin wrapper over parry ray casts
- world:        collider store and layer-filtered queries
- probe:        ray origins, counts and spacing for one body
- contacts:     per-move contact snapshot
- controller:   the motion resolver
*/

pub mod broad;
pub mod contacts;
pub mod controller;
pub mod narrow_phase;
pub mod probe;
pub mod settings;
pub mod types;
pub mod world;

// Re-export commonly used types.
pub use contacts::{CollisionInfo, Contacts};
pub use controller::Controller;
pub use probe::{CollisionProbe, RaycastOrigins};
pub use settings::ControllerSettings;
pub use types::{Aabb, BodyBounds, BodyId, FrameTime, RayHit, Space, Vec2};
pub use world::{Collider, CollisionWorld};
