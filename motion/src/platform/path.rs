use serde::{Deserialize, Serialize};

use crate::collision::types::{FrameTime, Vec2};
use crate::error::ConfigError;

/// Waypoint route of a moving platform, as authored in level data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Waypoints relative to the platform's spawn position.
    pub local_waypoints: Vec<Vec2>,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Loop back to the first waypoint instead of reversing.
    pub cyclic: bool,
    /// Pause at every waypoint (seconds).
    pub wait_time: f32,
    /// 0 is linear; higher values ease in and out harder.
    pub ease_amount: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            local_waypoints: Vec::new(),
            speed: 5.0,
            cyclic: false,
            wait_time: 0.0,
            ease_amount: 0.0,
        }
    }
}

impl PlatformConfig {
    pub const MAX_EASE_AMOUNT: f32 = 3.0;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=Self::MAX_EASE_AMOUNT).contains(&self.ease_amount) {
            return Err(ConfigError::EaseOutOfRange(self.ease_amount));
        }
        if !(self.speed >= 0.0) {
            return Err(ConfigError::NegativeSpeed(self.speed));
        }
        if !self.wait_time.is_finite() {
            return Err(ConfigError::NotFinite("wait_time"));
        }
        if self.local_waypoints.iter().any(|w| !(w.x.is_finite() && w.y.is_finite())) {
            return Err(ConfigError::NotFinite("local_waypoints"));
        }
        Ok(())
    }
}

/// `x^a / (x^a + (1 - x)^a)` with `a = ease_amount + 1`.
///
/// Maps 0 to 0, 1 to 1 and 0.5 to 0.5; `ease_amount == 0` is the identity.
pub fn ease(x: f32, ease_amount: f32) -> f32 {
    let a = ease_amount + 1.0;
    let head = x.powf(a);
    head / (head + (1.0 - x).powf(a))
}

/// Progress of a platform along its waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointPath {
    global_waypoints: Vec<Vec2>,
    cyclic: bool,
    speed: f32,
    wait_time: f32,
    ease_amount: f32,
    from_index: usize,
    percent: f32,
    next_move_time: f32,
}

impl WaypointPath {
    /// Anchor the configured waypoints at `origin`.
    pub fn new(config: &PlatformConfig, origin: Vec2) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            global_waypoints: config.local_waypoints.iter().map(|w| w + origin).collect(),
            cyclic: config.cyclic,
            speed: config.speed,
            wait_time: config.wait_time,
            ease_amount: config.ease_amount,
            from_index: 0,
            percent: 0.0,
            next_move_time: 0.0,
        })
    }

    #[inline]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.global_waypoints
    }

    #[inline]
    pub fn from_index(&self) -> usize {
        self.from_index
    }

    #[inline]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Displacement that brings a platform at `current` to its position for this frame.
    ///
    /// Zero while waiting at a waypoint or when there is no segment to travel.
    pub fn advance(&mut self, clock: FrameTime, current: Vec2) -> Vec2 {
        let len = self.global_waypoints.len();
        if len < 2 || clock.now < self.next_move_time {
            return Vec2::zeros();
        }

        self.from_index %= len;
        let to_index = (self.from_index + 1) % len;
        let from = self.global_waypoints[self.from_index];
        let to = self.global_waypoints[to_index];
        let distance = (to - from).norm();

        self.percent = if distance > 0.0 {
            (self.percent + clock.dt * self.speed / distance).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = ease(self.percent, self.ease_amount);
        let new_pos = from.lerp(&to, eased);

        if self.percent >= 1.0 {
            self.percent = 0.0;
            self.from_index += 1;

            if !self.cyclic && self.from_index >= len - 1 {
                self.from_index = 0;
                self.global_waypoints.reverse();
            }
            self.next_move_time = clock.now + self.wait_time;
            log::debug!("platform reached waypoint, next segment starts at index {}", self.from_index);
        }

        new_pos - current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(waypoints: &[(f32, f32)], cyclic: bool) -> PlatformConfig {
        PlatformConfig {
            local_waypoints: waypoints.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
            speed: 2.0,
            cyclic,
            ..Default::default()
        }
    }

    #[test]
    fn ease_is_symmetric_and_pinned() {
        for amount in [0.0, 1.0, 2.0, 3.0] {
            assert!(ease(0.0, amount).abs() < 1.0e-6);
            assert!((ease(1.0, amount) - 1.0).abs() < 1.0e-6);
            assert!((ease(0.5, amount) - 0.5).abs() < 1.0e-6);
            let x = 0.2;
            assert!((ease(x, amount) + ease(1.0 - x, amount) - 1.0).abs() < 1.0e-5);
        }
        assert!((ease(0.3, 0.0) - 0.3).abs() < 1.0e-6);
        assert!(ease(0.3, 2.0) < 0.3);
    }

    #[test]
    fn ping_pong_reverses_in_place() {
        let mut path = WaypointPath::new(&config(&[(0.0, 0.0), (2.0, 0.0)], false), Vec2::new(10.0, 0.0)).unwrap();
        let mut pos = Vec2::new(10.0, 0.0);
        let mut clock = FrameTime::new(0.0, 0.5);

        // Two units at two units per second: one second per leg.
        for _ in 0..2 {
            clock = clock.advanced(0.5);
            pos += path.advance(clock, pos);
        }
        assert!((pos.x - 12.0).abs() < 1.0e-5);
        assert_eq!(path.from_index(), 0);
        assert_eq!(path.percent(), 0.0);
        assert_eq!(path.waypoints()[0], Vec2::new(12.0, 0.0));

        for _ in 0..2 {
            clock = clock.advanced(0.5);
            pos += path.advance(clock, pos);
        }
        assert!((pos.x - 10.0).abs() < 1.0e-5);
    }

    #[test]
    fn cyclic_route_wraps_around() {
        let mut path =
            WaypointPath::new(&config(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)], true), Vec2::zeros()).unwrap();
        let mut pos = Vec2::zeros();
        let mut clock = FrameTime::new(0.0, 0.0);
        let mut visited = Vec::new();
        for _ in 0..40 {
            clock = clock.advanced(0.25);
            pos += path.advance(clock, pos);
            visited.push(path.from_index());
        }
        assert!(visited.contains(&2));
        assert!(path.waypoints()[0] == Vec2::zeros(), "cyclic routes are never reversed");
    }

    #[test]
    fn waits_at_each_waypoint() {
        let mut cfg = config(&[(0.0, 0.0), (1.0, 0.0)], false);
        cfg.speed = 1.0;
        cfg.wait_time = 1.0;
        let mut path = WaypointPath::new(&cfg, Vec2::zeros()).unwrap();
        let mut pos = Vec2::zeros();

        pos += path.advance(FrameTime::new(1.0, 1.0), pos);
        assert!((pos.x - 1.0).abs() < 1.0e-6);

        let waiting = path.advance(FrameTime::new(1.5, 0.5), pos);
        assert_eq!(waiting, Vec2::zeros());

        let moving = path.advance(FrameTime::new(2.5, 0.5), pos);
        assert!(moving.x < 0.0);
    }

    #[test]
    fn rejects_bad_ease() {
        let mut cfg = config(&[(0.0, 0.0), (1.0, 0.0)], false);
        cfg.ease_amount = 4.0;
        assert_eq!(WaypointPath::new(&cfg, Vec2::zeros()).unwrap_err(), ConfigError::EaseOutOfRange(4.0));
    }

    #[test]
    fn single_waypoint_never_moves() {
        let mut path = WaypointPath::new(&config(&[(0.0, 0.0)], false), Vec2::zeros()).unwrap();
        assert_eq!(path.advance(FrameTime::new(1.0, 1.0), Vec2::zeros()), Vec2::zeros());
    }
}
