//! Direction of travel in degrees
//!
//! 0° points right (east) and angles grow clockwise on screen, so 90° points
//! down because terminal rows grow downward.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::{cartesian_to_polar, normalize_degrees, polar_to_cartesian};

/// An angle in degrees, always in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Angle(f32);

impl Angle {
    pub const RIGHT: Angle = Angle(0.0);
    pub const DOWN: Angle = Angle(90.0);
    pub const LEFT: Angle = Angle(180.0);
    pub const UP: Angle = Angle(270.0);

    /// Create an angle, normalizing into [0, 360). Non-finite input is rejected.
    pub fn new(degrees: f32) -> Result<Self, GeometryError> {
        let degrees = GeometryError::check_finite("angle", degrees)?;
        Ok(Self::wrap(degrees))
    }

    /// Normalize a value already known to be finite
    #[inline]
    pub(crate) fn wrap(degrees: f32) -> Self {
        Angle(normalize_degrees(degrees))
    }

    /// Direction of a vector (y down). A zero vector points right.
    pub fn from_vector(v: Vec2) -> Self {
        if v.length_squared() <= f32::EPSILON || !v.is_finite() {
            return Angle::RIGHT;
        }
        Angle(cartesian_to_polar(v).1)
    }

    #[inline]
    pub fn degrees(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f32 {
        self.0.to_radians()
    }

    /// Unit vector pointing along this angle
    pub fn to_unit_vector(self) -> Vec2 {
        polar_to_cartesian(1.0, self.0)
    }

    /// Rotate clockwise by `degrees`. A non-finite delta leaves the angle unchanged.
    pub fn add(self, degrees: f32) -> Self {
        if !degrees.is_finite() {
            log::warn!("ignoring non-finite angle delta {degrees} applied to {self}");
            return self;
        }
        Self::wrap(self.0 + degrees)
    }

    /// The angle pointing the other way
    pub fn opposite(self) -> Self {
        self.add(180.0)
    }

    /// Unsigned size of the smaller arc between two angles, in [0, 180]
    pub fn diff_shortest(self, other: Angle) -> f32 {
        let d = (self.0 - other.0).abs();
        d.min(360.0 - d)
    }

    /// Degrees to rotate clockwise from `self` to reach `other`, in [0, 360)
    pub fn diff_clockwise(self, other: Angle) -> f32 {
        normalize_degrees(other.0 - self.0)
    }

    /// Degrees to rotate counter-clockwise from `self` to reach `other`, in [0, 360)
    pub fn diff_counter_clockwise(self, other: Angle) -> f32 {
        normalize_degrees(self.0 - other.0)
    }

    /// Signed shortest rotation from `self` to `other`, in [-180, 180)
    pub fn diff_signed(self, other: Angle) -> f32 {
        normalize_degrees(other.0 - self.0 + 180.0) - 180.0
    }

    /// The angle halfway along the shorter arc between `self` and `other`
    pub fn bisect(self, other: Angle) -> Self {
        self.add(self.diff_signed(other) / 2.0)
    }

    /// Snap to the nearest multiple of `step` degrees
    pub fn round_to_nearest(self, step: f32) -> Self {
        if !(step.is_finite() && step > 0.0) {
            return self;
        }
        Self::wrap((self.0 / step).round() * step)
    }

    /// Degrees away from the horizontal axis, in [0, 90]
    pub fn degrees_from_flat(self) -> f32 {
        self.diff_shortest(Angle::RIGHT)
            .min(self.diff_shortest(Angle::LEFT))
    }

    /// Mirror across the vertical axis (what a left/right wall does)
    pub fn mirror_horizontally(self) -> Self {
        Self::wrap(180.0 - self.0)
    }

    /// Mirror across the horizontal axis (what a floor/ceiling does)
    pub fn mirror_vertically(self) -> Self {
        Self::wrap(360.0 - self.0)
    }
}

impl TryFrom<f32> for Angle {
    type Error = GeometryError;

    fn try_from(degrees: f32) -> Result<Self, Self::Error> {
        Angle::new(degrees)
    }
}

impl From<Angle> for f32 {
    fn from(angle: Angle) -> f32 {
        angle.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}
