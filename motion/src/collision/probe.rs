use crate::constants::MIN_RAY_COUNT;

use super::{
    settings::ControllerSettings,
    types::{Aabb, Vec2},
};

/// Corners of the probe box, already inset by the skin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RaycastOrigins {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

/// Ray origins, counts and spacing derived from a body box.
///
/// Horizontal rays are cast from a vertical edge and are therefore stacked
/// along y; vertical rays are spread along x.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionProbe {
    pub origins: RaycastOrigins,
    pub horizontal_ray_count: usize,
    pub vertical_ray_count: usize,
    pub horizontal_ray_spacing: f32,
    pub vertical_ray_spacing: f32,
}

impl CollisionProbe {
    pub fn from_bounds(bounds: &Aabb, settings: &ControllerSettings) -> Self {
        let mut probe = Self::default();
        probe.recompute(bounds, settings);
        probe
    }

    /// Recompute origins, ray counts and spacing for `bounds`.
    pub fn recompute(&mut self, bounds: &Aabb, settings: &ControllerSettings) {
        let inner = bounds.inset(settings.skin_width);
        debug_assert!(
            inner.half_extents.x > 0.0 && inner.half_extents.y > 0.0,
            "body {bounds:?} is too small for skin width {}",
            settings.skin_width
        );

        let (min, max) = (inner.min(), inner.max());
        self.origins = RaycastOrigins {
            top_left: Vec2::new(min.x, max.y),
            top_right: Vec2::new(max.x, max.y),
            bottom_left: Vec2::new(min.x, min.y),
            bottom_right: Vec2::new(max.x, min.y),
        };

        let size = inner.size();
        self.horizontal_ray_count = ray_count(size.y, settings.distance_between_rays);
        self.vertical_ray_count = ray_count(size.x, settings.distance_between_rays);
        self.horizontal_ray_spacing = size.y / (self.horizontal_ray_count - 1) as f32;
        self.vertical_ray_spacing = size.x / (self.vertical_ray_count - 1) as f32;
    }

    /// Origin of the `index`-th horizontal ray on the left (`direction_x < 0`) or right edge.
    #[inline]
    pub fn horizontal_origin(&self, direction_x: f32, index: usize) -> Vec2 {
        let base = if direction_x < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.bottom_right
        };
        base + Vec2::new(0.0, self.horizontal_ray_spacing * index as f32)
    }

    /// Origin of the `index`-th vertical ray on the bottom (`direction_y < 0`) or top edge.
    #[inline]
    pub fn vertical_origin(&self, direction_y: f32, index: usize) -> Vec2 {
        let base = if direction_y < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.top_left
        };
        base + Vec2::new(self.vertical_ray_spacing * index as f32, 0.0)
    }
}

/// `round(length / spacing)`, never fewer than one ray per corner.
fn ray_count(length: f32, max_spacing: f32) -> usize {
    let count = (length / max_spacing).round();
    if count.is_finite() && count > MIN_RAY_COUNT as f32 {
        count as usize
    } else {
        MIN_RAY_COUNT
    }
}
