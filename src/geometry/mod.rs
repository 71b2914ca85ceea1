//! Geometry primitives
//!
//! Immutable value types used by hit detection and motion. Coordinates are in
//! terminal cells: `left` grows to the right and `top` grows downward.

pub mod angle;
pub mod edge;
pub mod loc;
pub mod rect;

pub use angle::Angle;
pub use edge::{Edge, Side};
pub use loc::LocF;
pub use rect::RectF;

use crate::consts::VERTICAL_STRETCH;

/// How a polar displacement accounts for the non-square terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skew {
    /// Shrink vertical travel so motion looks uniform on screen
    #[default]
    Normal,
    /// Grow vertical travel (inverse of `Normal`)
    Reverse,
    /// Plain euclidean displacement
    Off,
}

impl Skew {
    /// Multiplier applied to a distance travelled along `angle`.
    ///
    /// The stretch is linear in degrees-from-flat: 1.0 for horizontal travel
    /// and `VERTICAL_STRETCH` for vertical travel. `Normal` divides by it.
    pub fn factor(self, angle: Angle) -> f32 {
        let stretch = 1.0 + (VERTICAL_STRETCH - 1.0) * angle.degrees_from_flat() / 90.0;
        match self {
            Skew::Normal => 1.0 / stretch,
            Skew::Reverse => stretch,
            Skew::Off => 1.0,
        }
    }
}
