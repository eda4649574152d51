/*!
Collision layers.

Every collider in the world carries exactly one [`Layer`]. Queries filter by a
[`LayerMask`]. Bit indices match the level data the game ships with, so the
default masks serialize to the same integers (`2560` for collidables, `1280`
for passengers).
*/

use crate::bitmask_flags::{BitmaskFlags, FlagBitmask};

crate::define_bitmask_flags!(Layer, u32, {
    Default = 0,
    Player = 8,
    Obstacle = 9,
    Enemy = 10,
    Platform = 11,
    Effect = 12,
});

pub type LayerMask = BitmaskFlags<u32>;

impl Layer {
    #[inline]
    pub fn as_mask(self) -> LayerMask {
        LayerMask::new(self.mask())
    }
}

/// Geometry that stops motion: static obstacles and moving platforms.
#[inline]
pub fn collidable_mask() -> LayerMask {
    LayerMask::from_tags(&[Layer::Obstacle, Layer::Platform])
}

/// Bodies moving platforms carry or push.
#[inline]
pub fn passenger_mask() -> LayerMask {
    LayerMask::from_tags(&[Layer::Player, Layer::Enemy])
}
