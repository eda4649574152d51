/// Inset kept between a body's collision probe and the surfaces it touches (world units).
///
/// Every ray starts `SKIN_WIDTH` inside the body box and every clipped move stops
/// `SKIN_WIDTH` short of the hit, so exact contact never has to be compared with `==`.
pub const SKIN_WIDTH: f32 = 0.015;

/// Upper bound on the distance between two parallel probe rays (world units).
///
/// The actual spacing is derived per body so rays land exactly on both corners.
pub const DISTANCE_BETWEEN_RAYS: f32 = 0.25;

/// Minimum number of rays along one edge of a probe. One ray per corner.
pub const MIN_RAY_COUNT: usize = 2;

/// Practical small distance for comparisons (world units).
pub const DIST_EPS: f32 = 1.0e-6;

/// Ray length used when a requested move is shorter than the skin: `2 * SKIN_WIDTH`.
#[inline]
pub const fn minimal_probe_length(skin_width: f32) -> f32 {
    2.0 * skin_width
}

/// Sign with `sign(0) == 1`.
///
/// A resting body therefore probes towards positive x/y instead of not probing at all.
#[inline]
pub fn sign_or_positive(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}
