//! cellmotion - continuous 2D motion and collision for terminal cell grids
//!
//! Core modules:
//! - `geometry`: Angle, point, rectangle and edge value types
//! - `sim`: Collider contract, hit detection, velocities, the collider group and effects
//! - `settings`: Engine tuning (cadence, precision, capacity)
//! - `error`: Error taxonomy shared by all of the above

pub mod error;
pub mod geometry;
pub mod settings;
pub mod sim;

pub use error::{EngineError, GeometryError, Result};
pub use geometry::{Angle, Edge, LocF, RectF, Side, Skew};
pub use settings::{CadencePreset, EngineSettings};

use glam::Vec2;

/// Engine tuning defaults
pub mod consts {
    /// Travel along a vertical heading is scaled by this factor (terminal cells are taller than wide)
    pub const VERTICAL_STRETCH: f32 = 2.0;

    /// Default cap on concurrently registered colliders
    pub const DEFAULT_MAX_COLLIDERS: usize = 1000;

    /// Slowest re-evaluation cadence (ms), used for near-stationary objects
    pub const LEAST_FREQUENT_INTERVAL_MS: u64 = 100;
    /// Fastest re-evaluation cadence (ms), used at or above `FAST_SPEED`
    pub const MOST_FREQUENT_INTERVAL_MS: u64 = 25;
    /// Speed (units/sec) at or below which the slowest cadence applies
    pub const SLOW_SPEED: f32 = 0.0;
    /// Speed (units/sec) at or above which the fastest cadence applies
    pub const FAST_SPEED: f32 = 60.0;

    /// Hit detection march increment
    pub const STEP_PRECISION: f32 = 0.5;
    /// Visibility is the travel distance times this factor
    pub const LOOKAHEAD: f32 = 1.5;
    /// Distance kept between a mover and the obstacle it struck
    pub const IMPACT_BACKOFF: f32 = 0.5;

    /// Downward acceleration used by gravity (units/sec²)
    pub const GRAVITY: f32 = 20.0;
    /// Default rate at which effects re-run (ms)
    pub const EFFECT_INTERVAL_MS: u64 = 50;
}

/// Normalize degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert polar (distance, degrees) to cartesian (x, y), y growing downward
#[inline]
pub fn polar_to_cartesian(distance: f32, degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(distance * theta.cos(), distance * theta.sin())
}

/// Convert cartesian (x, y) to polar (distance, degrees in [0, 360))
#[inline]
pub fn cartesian_to_polar(v: Vec2) -> (f32, f32) {
    (v.length(), normalize_degrees(v.y.atan2(v.x).to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        let tiny = normalize_degrees(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_polar_round_trip() {
        let v = polar_to_cartesian(2.0, 90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 2.0).abs() < 1e-5);

        let (r, deg) = cartesian_to_polar(Vec2::new(-3.0, 0.0));
        assert!((r - 3.0).abs() < 1e-5);
        assert!((deg - 180.0).abs() < 1e-3);
    }
}
