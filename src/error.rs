//! Error types for the motion engine
//!
//! Geometry values, registrations and settings are validated on every build
//! profile. A failed operation leaves the rest of the simulation untouched.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;

/// Malformed geometric input
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate, size or angle was NaN or infinite
    #[error("non-finite {what}: {value}")]
    NonFinite {
        /// Which quantity was rejected
        what: &'static str,
        /// The offending value
        value: f32,
    },

    /// A rectangle was given a negative width or height
    #[error("negative rectangle size: {width} x {height}")]
    NegativeSize { width: f32, height: f32 },
}

impl GeometryError {
    /// Reject `value` unless it is finite
    pub fn check_finite(what: &'static str, value: f32) -> std::result::Result<f32, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(GeometryError::NonFinite { what, value })
        }
    }
}

/// Errors surfaced by the collider group, velocities and settings
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The group already tracks `max` colliders
    #[error("collider capacity reached: at most {max} concurrent colliders")]
    CapacityExceeded { max: usize },

    /// A collider with this identity is already registered
    #[error("collider with identity {identity:#x} is already registered")]
    AlreadyRegistered { identity: u64 },

    /// The group's lifetime has ended
    #[error("collider group has been disposed")]
    Disposed,

    /// A speed or speed ratio was negative or non-finite
    #[error("invalid speed: {value} (must be finite and >= 0)")]
    InvalidSpeed { value: f32 },

    /// A settings field is outside its usable range
    #[error("invalid setting `{name}` = {value}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Validate a speed-like quantity
    pub fn check_speed(value: f32) -> Result<f32> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(EngineError::InvalidSpeed { value })
        }
    }
}
