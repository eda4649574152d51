use crate::layers::{Layer, LayerMask};

use super::types::Vec2;

/// Layers touched on one side of a body during the last move.
///
/// Truthy when any layer was touched; `contains` asks about a specific one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts(pub LayerMask);

impl Contacts {
    #[inline]
    pub fn any(&self) -> bool {
        !self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, layer: Layer) -> bool {
        self.0.has(layer)
    }

    #[inline]
    pub fn add(&mut self, layer: Layer) {
        self.0.add(layer);
    }

    #[inline]
    pub fn mask(&self) -> LayerMask {
        self.0
    }
}

/// Contact snapshot produced by one `move_by` call.
///
/// `front`/`back` are relative to the facing direction at the time of the move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionInfo {
    pub above: Contacts,
    pub below: Contacts,
    pub front: Contacts,
    pub back: Contacts,
    /// Requested displacement in local space, before clipping.
    pub move_amount_old: Vec2,
    /// Surface normal of the nearest ground hit, zero when airborne.
    pub below_normal: Vec2,
}

impl CollisionInfo {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Any side touched.
    #[inline]
    pub fn any(&self) -> bool {
        self.above.any() || self.below.any() || self.front.any() || self.back.any()
    }

    #[inline]
    pub fn swap_front_back(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contacts_track_layers() {
        let mut contacts = Contacts::default();
        assert!(!contacts.any());
        contacts.add(Layer::Platform);
        assert!(contacts.any());
        assert!(contacts.contains(Layer::Platform));
        assert!(!contacts.contains(Layer::Obstacle));
    }

    #[test]
    fn swap_exchanges_sides_only() {
        let mut info = CollisionInfo::default();
        info.front.add(Layer::Obstacle);
        info.below.add(Layer::Platform);
        info.swap_front_back();
        assert!(info.back.contains(Layer::Obstacle));
        assert!(!info.front.any());
        assert!(info.below.contains(Layer::Platform));
    }
}
