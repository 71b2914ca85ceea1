//! 2D point in cell coordinates

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Angle, Skew};

/// A point (left, top)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocF {
    pub left: f32,
    pub top: f32,
}

impl LocF {
    pub const fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite()
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn from_vec2(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy)
    }

    pub fn distance(self, other: LocF) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// Direction from this point toward `other`
    pub fn angle_to(self, other: LocF) -> Angle {
        Angle::from_vector(other.to_vec2() - self.to_vec2())
    }

    /// Move `distance` along `angle`, scaled by the terminal skew
    pub fn offset_by_angle_and_distance(self, angle: Angle, distance: f32, skew: Skew) -> Self {
        let d = angle.to_unit_vector() * distance * skew.factor(angle);
        self.offset(d.x, d.y)
    }
}
