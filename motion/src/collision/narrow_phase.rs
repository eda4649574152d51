use rapier2d::math::{Isometry, Point, Vector};
use rapier2d::parry::{
    query::{Ray, RayCast},
    shape as pshape,
};

use super::types::{Aabb, Vec2};

/// Impact of a ray against a single box.
#[derive(Clone, Copy, Debug)]
pub struct BoxRayHit {
    /// Distance along the (unit) ray direction.
    pub distance: f32,
    pub normal: Vec2,
}

/// Cast a ray against one axis-aligned box and return the first impact, if any.
///
/// - `dir` must be unit length so the returned time of impact is a distance.
/// - The box is solid: a ray starting inside reports a hit at distance 0 with a
///   zero normal. Callers decide whether such hits count.
pub fn cast_ray_against_box(origin: Vec2, dir: Vec2, max_distance: f32, body: &Aabb) -> Option<BoxRayHit> {
    let cuboid = pshape::Cuboid::new(Vector::new(body.half_extents.x, body.half_extents.y));
    let box_iso = Isometry::translation(body.center.x, body.center.y);
    let ray = Ray::new(Point::new(origin.x, origin.y), Vector::new(dir.x, dir.y));

    cuboid
        .cast_ray_and_get_normal(&box_iso, &ray, max_distance, true)
        .map(|hit| BoxRayHit {
            distance: hit.time_of_impact,
            // Convert component-wise so the API type does not depend on parry's nalgebra.
            normal: Vec2::new(hit.normal.x, hit.normal.y),
        })
}
