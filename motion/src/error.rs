//! Construction-time configuration errors.

use thiserror::Error;

use crate::collision::types::Vec2;

/// A body, probe or platform was configured with values the resolver cannot work with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("half extents must be positive, got ({}, {})", .0.x, .0.y)]
    NonPositiveExtents(Vec2),

    #[error("skin width must be positive and smaller than the body, got {0}")]
    InvalidSkinWidth(f32),

    #[error("ray spacing must be positive, got {0}")]
    InvalidRaySpacing(f32),

    #[error("collision mask is empty")]
    EmptyCollisionMask,

    #[error("ease amount must lie in [0, 3], got {0}")]
    EaseOutOfRange(f32),

    #[error("platform speed must be non-negative, got {0}")]
    NegativeSpeed(f32),

    #[error("value is not finite: {0}")]
    NotFinite(&'static str),
}
