/*!
Ray-sweep controller settings.

These values centralize the tolerances used by the collision probe, the motion
resolver and the platform transport. Keep them as defaults and override from
actor data when a body needs something else.

Notes
- Distances are in world units, time in seconds.
- The skin must stay well below half of the smallest body dimension, otherwise
  the inset probe collapses.
*/

use serde::{Deserialize, Serialize};

use crate::constants::{DISTANCE_BETWEEN_RAYS, SKIN_WIDTH};
use crate::error::ConfigError;

use super::types::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Inset of the probe and clearance kept from every hit.
    pub skin_width: f32,
    /// Upper bound on the spacing between parallel rays.
    pub distance_between_rays: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            skin_width: SKIN_WIDTH,
            distance_between_rays: DISTANCE_BETWEEN_RAYS,
        }
    }
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.skin_width.is_finite() && self.skin_width > 0.0) {
            return Err(ConfigError::InvalidSkinWidth(self.skin_width));
        }
        if !(self.distance_between_rays.is_finite() && self.distance_between_rays > 0.0) {
            return Err(ConfigError::InvalidRaySpacing(self.distance_between_rays));
        }
        Ok(())
    }

    /// Check that a body with these half extents leaves room for the inset probe.
    pub fn validate_extents(&self, half_extents: Vec2) -> Result<(), ConfigError> {
        if !(half_extents.x > 0.0 && half_extents.y > 0.0) {
            return Err(ConfigError::NonPositiveExtents(half_extents));
        }
        if half_extents.x <= self.skin_width || half_extents.y <= self.skin_width {
            return Err(ConfigError::InvalidSkinWidth(self.skin_width));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ControllerSettings::default();
        assert!(settings.validate().is_ok());
        assert!((settings.skin_width - 0.015).abs() < 1.0e-9);
        assert!((settings.distance_between_rays - 0.25).abs() < 1.0e-9);
    }

    #[test]
    fn partial_data_keeps_defaults() {
        let settings: ControllerSettings =
            serde_json::from_str(r#"{ "skin_width": 0.02 }"#).unwrap();
        assert!((settings.skin_width - 0.02).abs() < 1.0e-9);
        assert!((settings.distance_between_rays - 0.25).abs() < 1.0e-9);
    }

    #[test]
    fn rejects_degenerate_values() {
        let bad_skin = ControllerSettings {
            skin_width: 0.0,
            ..Default::default()
        };
        assert_eq!(bad_skin.validate(), Err(ConfigError::InvalidSkinWidth(0.0)));

        let settings = ControllerSettings::default();
        assert!(matches!(
            settings.validate_extents(Vec2::new(0.0, 1.0)),
            Err(ConfigError::NonPositiveExtents(_))
        ));
        assert!(settings.validate_extents(Vec2::new(0.5, 0.5)).is_ok());
    }
}
