//! Short-lived effects fired by guards: growing beams and particle bursts.
//!
//! Enemies never own projectiles. They queue [`SpawnRequest`]s on the
//! [`Spawner`] during their tick and the simulation materializes them
//! afterwards, so a guard only keeps the [`ProjectileId`] of the beam it may
//! have to stop later.

mod laser;
mod particle;

use motion::Vec2;
use serde::{Deserialize, Serialize};

pub use laser::Laser;
pub use particle::Particle;

use crate::tuning::{LaserTuning, ParticleTuning};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum SpawnRequest {
    Beam {
        id: ProjectileId,
        origin: Vec2,
        heading_right: bool,
        tuning: LaserTuning,
    },
    Particles {
        origin: Vec2,
        heading_right: bool,
        count: usize,
        tuning: ParticleTuning,
    },
    /// Stop growing and start retracting the beam.
    Stop(ProjectileId),
}

#[derive(Debug, Default)]
pub struct Spawner {
    next_id: u32,
    requests: Vec<SpawnRequest>,
}

impl Spawner {
    pub fn beam(&mut self, origin: Vec2, heading_right: bool, tuning: &LaserTuning) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.requests.push(SpawnRequest::Beam {
            id,
            origin,
            heading_right,
            tuning: tuning.clone(),
        });
        id
    }

    pub fn particles(&mut self, origin: Vec2, heading_right: bool, count: usize, tuning: &ParticleTuning) {
        self.requests.push(SpawnRequest::Particles {
            origin,
            heading_right,
            count,
            tuning: tuning.clone(),
        });
    }

    pub fn stop(&mut self, id: ProjectileId) {
        self.requests.push(SpawnRequest::Stop(id));
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SpawnRequest> + '_ {
        self.requests.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_ids_are_unique_and_requests_drain_in_order() {
        let mut spawner = Spawner::default();
        let a = spawner.beam(Vec2::zeros(), true, &LaserTuning::default());
        let b = spawner.beam(Vec2::zeros(), false, &LaserTuning::aiming_line());
        assert_ne!(a, b);
        spawner.stop(a);

        let drained: Vec<_> = spawner.drain().collect();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[2], SpawnRequest::Stop(a));
        assert!(spawner.is_empty());
    }
}
