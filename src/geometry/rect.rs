//! Axis-aligned rectangle
//!
//! `RectF` is the shape every collider reports. Sizes are expected to be
//! non-negative; `try_new`/`validate` enforce that along with finiteness.

use serde::{Deserialize, Serialize};

use super::{Angle, Edge, LocF, Side, Skew};
use crate::error::GeometryError;

/// Axis-aligned box (left, top, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    /// Unchecked constructor for values known to be well formed
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Checked constructor
    pub fn try_new(left: f32, top: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        let rect = Self::new(left, top, width, height);
        rect.validate()?;
        Ok(rect)
    }

    /// Reject non-finite coordinates and negative sizes
    pub fn validate(&self) -> Result<(), GeometryError> {
        GeometryError::check_finite("left", self.left)?;
        GeometryError::check_finite("top", self.top)?;
        GeometryError::check_finite("width", self.width)?;
        GeometryError::check_finite("height", self.height)?;
        if self.width < 0.0 || self.height < 0.0 {
            return Err(GeometryError::NegativeSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn top_left(&self) -> LocF {
        LocF::new(self.left, self.top)
    }

    pub fn top_right(&self) -> LocF {
        LocF::new(self.right(), self.top)
    }

    pub fn bottom_left(&self) -> LocF {
        LocF::new(self.left, self.bottom())
    }

    pub fn bottom_right(&self) -> LocF {
        LocF::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> LocF {
        LocF::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn top_edge(&self) -> Edge {
        Edge::new(self.top_left(), self.top_right())
    }

    pub fn bottom_edge(&self) -> Edge {
        Edge::new(self.bottom_left(), self.bottom_right())
    }

    pub fn left_edge(&self) -> Edge {
        Edge::new(self.top_left(), self.bottom_left())
    }

    pub fn right_edge(&self) -> Edge {
        Edge::new(self.top_right(), self.bottom_right())
    }

    pub fn edge(&self, side: Side) -> Edge {
        match side {
            Side::Top => self.top_edge(),
            Side::Right => self.right_edge(),
            Side::Bottom => self.bottom_edge(),
            Side::Left => self.left_edge(),
        }
    }

    /// The four sides in top, right, bottom, left order
    pub fn edges(&self) -> [Edge; 4] {
        Side::ALL.map(|side| self.edge(side))
    }

    /// Same size, moved so the top-left corner is at `loc`
    pub fn with_position(&self, loc: LocF) -> Self {
        Self::new(loc.left, loc.top, self.width, self.height)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Move `distance` along `angle`, scaled by the terminal skew
    pub fn offset_by_angle_and_distance(&self, angle: Angle, distance: f32, skew: Skew) -> Self {
        self.with_position(self.top_left().offset_by_angle_and_distance(angle, distance, skew))
    }

    /// Grow (or shrink, for negative amounts) on every side
    pub fn grow(&self, amount: f32) -> Self {
        Self::new(
            self.left - amount,
            self.top - amount,
            (self.width + amount * 2.0).max(0.0),
            (self.height + amount * 2.0).max(0.0),
        )
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &RectF) -> Self {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        Self::new(
            left,
            top,
            self.right().max(other.right()) - left,
            self.bottom().max(other.bottom()) - top,
        )
    }

    /// Strict overlap: the boxes cross on both axes, sharing a boundary is not enough
    pub fn overlaps(&self, other: &RectF) -> bool {
        self.left < other.right()
            && self.right() > other.left
            && self.top < other.bottom()
            && self.bottom() > other.top
    }

    /// Overlapping or sharing a boundary
    pub fn touches(&self, other: &RectF) -> bool {
        self.left <= other.right()
            && self.right() >= other.left
            && self.top <= other.bottom()
            && self.bottom() >= other.top
    }

    /// `other` lies entirely within this rectangle
    pub fn contains(&self, other: &RectF) -> bool {
        other.left >= self.left
            && other.right() <= self.right()
            && other.top >= self.top
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, loc: LocF) -> bool {
        loc.left >= self.left
            && loc.left <= self.right()
            && loc.top >= self.top
            && loc.top <= self.bottom()
    }

    /// Area of the intersection
    pub fn number_of_pixels_that_overlap(&self, other: &RectF) -> f32 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        w.max(0.0) * h.max(0.0)
    }

    /// Fraction of this rectangle's area covered by `other`, in [0, 1]
    pub fn overlap_percentage(&self, other: &RectF) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        (self.number_of_pixels_that_overlap(other) / area).clamp(0.0, 1.0)
    }

    /// Euclidean gap between the nearest corners or edges; 0 when touching or overlapping
    pub fn distance(&self, other: &RectF) -> f32 {
        let other_is_left = other.right() < self.left;
        let other_is_right = self.right() < other.left;
        let other_is_above = other.bottom() < self.top;
        let other_is_below = self.bottom() < other.top;

        match (other_is_left, other_is_right, other_is_above, other_is_below) {
            (true, _, true, _) => self.top_left().distance(other.bottom_right()),
            (true, _, _, true) => self.bottom_left().distance(other.top_right()),
            (_, true, _, true) => self.bottom_right().distance(other.top_left()),
            (_, true, true, _) => self.top_right().distance(other.bottom_left()),
            (true, _, _, _) => self.left - other.right(),
            (_, true, _, _) => other.left - self.right(),
            (_, _, true, _) => self.top - other.bottom(),
            (_, _, _, true) => other.top - self.bottom(),
            _ => 0.0,
        }
    }

    /// Distance between the two centers
    pub fn center_distance(&self, other: &RectF) -> f32 {
        self.center().distance(other.center())
    }

    /// Direction from this center toward the other center
    pub fn angle_to(&self, other: &RectF) -> Angle {
        self.center().angle_to(other.center())
    }
}
