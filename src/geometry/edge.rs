//! Rectangle sides and the segments that bound them

use serde::{Deserialize, Serialize};

use super::LocF;

/// A segment between two points. Rectangle edges are axis aligned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edge {
    pub from: LocF,
    pub to: LocF,
}

impl Edge {
    pub const fn new(from: LocF, to: LocF) -> Self {
        Self { from, to }
    }

    /// Left or right side of a rectangle
    pub fn is_vertical(&self) -> bool {
        self.from.left == self.to.left && self.from.top != self.to.top
    }

    /// Top or bottom side of a rectangle
    pub fn is_horizontal(&self) -> bool {
        self.from.top == self.to.top
    }

    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }
}

/// One side of an axis-aligned rectangle.
///
/// Orientation comes from the side itself, so it stays meaningful for
/// degenerate rectangles whose edges collapse to a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Left or right side
    pub const fn is_vertical(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Top or bottom side
    pub const fn is_horizontal(self) -> bool {
        !self.is_vertical()
    }

    pub const fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}
