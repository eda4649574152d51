//! Query world for the ray-sweep controllers.
//!
//! Design goals
//! - Deterministic: colliders live in a `BTreeMap` keyed by a monotonically
//!   increasing [`BodyId`], so every scan visits them in insertion order and
//!   ties between equally distant hits resolve to the lower id.
//! - Query-focused: ray casts and box overlaps filtered by a [`LayerMask`],
//!   with an optional body to ignore (the caster itself).
//! - Mutable: bodies are moved by their controllers every tick.

use std::collections::BTreeMap;

use crate::layers::{Layer, LayerMask};

use super::{
    broad, narrow_phase,
    types::{Aabb, BodyId, RayHit, Vec2},
};

/// A collider registered in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub aabb: Aabb,
    pub layer: Layer,
    /// Disabled colliders are skipped by every query.
    pub enabled: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CollisionWorld {
    colliders: BTreeMap<BodyId, Collider>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: Layer, aabb: Aabb) -> BodyId {
        debug_assert!(aabb.is_valid(), "collider box must have positive extents: {aabb:?}");
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.colliders.insert(
            id,
            Collider {
                aabb,
                layer,
                enabled: true,
            },
        );
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Collider> {
        self.colliders.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Replace the box of a collider. Unknown ids are ignored with a warning.
    pub fn set_aabb(&mut self, id: BodyId, aabb: Aabb) {
        debug_assert!(aabb.is_valid(), "collider box must have positive extents: {aabb:?}");
        match self.colliders.get_mut(&id) {
            Some(collider) => collider.aabb = aabb,
            None => log::warn!("set_aabb on unknown body {id:?}"),
        }
    }

    pub fn translate(&mut self, id: BodyId, delta: Vec2) {
        match self.colliders.get_mut(&id) {
            Some(collider) => collider.aabb.center += delta,
            None => log::warn!("translate on unknown body {id:?}"),
        }
    }

    pub fn set_enabled(&mut self, id: BodyId, enabled: bool) {
        if let Some(collider) = self.colliders.get_mut(&id) {
            collider.enabled = enabled;
        }
    }

    fn candidates(&self, mask: LayerMask, exclude: Option<BodyId>) -> impl Iterator<Item = (BodyId, &Collider)> {
        self.colliders
            .iter()
            .filter(move |(id, c)| c.enabled && mask.has(c.layer) && Some(**id) != exclude)
            .map(|(id, c)| (*id, c))
    }

    /// Cast a ray and return the nearest hit among colliders in `mask`.
    ///
    /// `dir` does not need to be normalized; distances are always world units.
    pub fn raycast(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
        exclude: Option<BodyId>,
    ) -> Option<RayHit> {
        let dir = dir.try_normalize(1.0e-12)?;
        if !(max_distance >= 0.0) {
            return None;
        }
        let segment = broad::ray_segment_aabb(origin, dir, max_distance);

        let mut best: Option<RayHit> = None;
        for (id, collider) in self.candidates(mask, exclude) {
            if !broad::ray_may_hit(&segment, &collider.aabb) {
                continue;
            }
            if let Some(hit) = narrow_phase::cast_ray_against_box(origin, dir, max_distance, &collider.aabb) {
                // Strict comparison: on equal distance the earlier (lower) id wins.
                if best.map_or(true, |b| hit.distance < b.distance) {
                    best = Some(RayHit {
                        distance: hit.distance,
                        point: origin + dir * hit.distance,
                        normal: hit.normal,
                        body: id,
                        layer: collider.layer,
                    });
                }
            }
        }
        best
    }

    /// Every hit along the ray, nearest first (ties by id).
    pub fn raycast_all(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
        exclude: Option<BodyId>,
    ) -> Vec<RayHit> {
        let Some(dir) = dir.try_normalize(1.0e-12) else {
            return Vec::new();
        };
        let segment = broad::ray_segment_aabb(origin, dir, max_distance);

        let mut hits: Vec<RayHit> = self
            .candidates(mask, exclude)
            .filter(|(_, c)| broad::ray_may_hit(&segment, &c.aabb))
            .filter_map(|(id, c)| {
                narrow_phase::cast_ray_against_box(origin, dir, max_distance, &c.aabb).map(|hit| RayHit {
                    distance: hit.distance,
                    point: origin + dir * hit.distance,
                    normal: hit.normal,
                    body: id,
                    layer: c.layer,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.body.cmp(&b.body)));
        hits
    }

    /// Ids of colliders in `mask` strictly overlapping `area`, in id order.
    pub fn overlap_box(&self, area: &Aabb, mask: LayerMask, exclude: Option<BodyId>) -> Vec<BodyId> {
        self.candidates(mask, exclude)
            .filter(|(_, c)| c.aabb.overlaps(area))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_walls() -> (CollisionWorld, BodyId, BodyId) {
        let mut world = CollisionWorld::new();
        let near = world.insert(Layer::Obstacle, Aabb::new(Vec2::new(3.0, 0.0), Vec2::new(0.5, 2.0)));
        let far = world.insert(Layer::Platform, Aabb::new(Vec2::new(6.0, 0.0), Vec2::new(0.5, 2.0)));
        (world, near, far)
    }

    #[test]
    fn raycast_returns_nearest_hit() {
        let (world, near, _) = world_with_walls();
        let hit = world
            .raycast(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, LayerMask::new(u32::MAX), None)
            .unwrap();
        assert_eq!(hit.body, near);
        assert_eq!(hit.layer, Layer::Obstacle);
        assert!((hit.distance - 2.5).abs() < 1.0e-5);
        assert!((hit.point.x - 2.5).abs() < 1.0e-5);
    }

    #[test]
    fn raycast_respects_mask_and_exclusion() {
        let (world, near, far) = world_with_walls();
        let hit = world
            .raycast(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, Layer::Platform.as_mask(), None)
            .unwrap();
        assert_eq!(hit.body, far);

        let hit = world
            .raycast(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, LayerMask::new(u32::MAX), Some(near))
            .unwrap();
        assert_eq!(hit.body, far);
    }

    #[test]
    fn equal_distance_prefers_lower_id() {
        let mut world = CollisionWorld::new();
        let first = world.insert(Layer::Obstacle, Aabb::new(Vec2::new(0.0, -2.0), Vec2::new(1.0, 1.0)));
        let _second = world.insert(Layer::Obstacle, Aabb::new(Vec2::new(0.0, -2.0), Vec2::new(3.0, 1.0)));
        let hit = world
            .raycast(Vec2::zeros(), Vec2::new(0.0, -1.0), 5.0, Layer::Obstacle.as_mask(), None)
            .unwrap();
        assert_eq!(hit.body, first);
    }

    #[test]
    fn raycast_all_sorts_by_distance() {
        let (world, near, far) = world_with_walls();
        let hits = world.raycast_all(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, LayerMask::new(u32::MAX), None);
        let ids: Vec<_> = hits.iter().map(|h| h.body).collect();
        assert_eq!(ids, vec![near, far]);
    }

    #[test]
    fn disabled_and_removed_colliders_are_ignored() {
        let (mut world, near, far) = world_with_walls();
        world.set_enabled(near, false);
        world.remove(far);
        assert!(world
            .raycast(Vec2::zeros(), Vec2::new(1.0, 0.0), 10.0, LayerMask::new(u32::MAX), None)
            .is_none());
    }

    #[test]
    fn overlap_box_filters_by_layer() {
        let (world, near, _) = world_with_walls();
        let area = Aabb::new(Vec2::new(4.5, 0.0), Vec2::new(2.0, 1.0));
        assert_eq!(world.overlap_box(&area, Layer::Obstacle.as_mask(), None), vec![near]);
        assert_eq!(world.overlap_box(&area, LayerMask::new(u32::MAX), None).len(), 2);
    }
}
