use rapier2d::math::{Isometry, Point, Vector};
use rapier2d::parry::{bounding_volume::Aabb as ParryAabb, shape as pshape};

use super::types::{Aabb, Vec2};

/// Bounding box of a ray segment `origin .. origin + dir * max_distance`.
pub fn ray_segment_aabb(origin: Vec2, dir: Vec2, max_distance: f32) -> ParryAabb {
    let end = origin + dir * max_distance;
    ParryAabb {
        mins: Point::new(origin.x.min(end.x), origin.y.min(end.y)),
        maxs: Point::new(origin.x.max(end.x), origin.y.max(end.y)),
    }
}

/// World-space AABB of a collider box, as parry sees it.
pub fn collider_aabb(body: &Aabb) -> ParryAabb {
    let cuboid = pshape::Cuboid::new(Vector::new(body.half_extents.x, body.half_extents.y));
    let iso = Isometry::translation(body.center.x, body.center.y);
    cuboid.aabb(&iso)
}

/// Inclusive AABB test: a ray grazing an edge is still a candidate.
pub fn aabb_intersects(a: &ParryAabb, b: &ParryAabb) -> bool {
    !(a.maxs.x < b.mins.x || a.mins.x > b.maxs.x || a.maxs.y < b.mins.y || a.mins.y > b.maxs.y)
}

/// Whether a collider can possibly be reached by the ray segment.
#[inline]
pub fn ray_may_hit(segment: &ParryAabb, body: &Aabb) -> bool {
    aabb_intersects(segment, &collider_aabb(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_box_spans_both_ends() {
        let seg = ray_segment_aabb(Vec2::new(1.0, 1.0), Vec2::new(-1.0, 0.0), 3.0);
        assert!((seg.mins.x + 2.0).abs() < 1.0e-6);
        assert!((seg.maxs.x - 1.0).abs() < 1.0e-6);
        assert!((seg.mins.y - seg.maxs.y).abs() < 1.0e-6);
    }

    #[test]
    fn prunes_distant_colliders() {
        let seg = ray_segment_aabb(Vec2::new(0.0, 0.0), Vec2::new(0.0, -1.0), 1.0);
        let near = Aabb::new(Vec2::new(0.0, -1.5), Vec2::new(2.0, 0.5));
        let far = Aabb::new(Vec2::new(5.0, -1.5), Vec2::new(0.5, 0.5));
        assert!(ray_may_hit(&seg, &near));
        assert!(!ray_may_hit(&seg, &far));
    }
}
