//! Predictive hit detection
//!
//! Marches a moving rectangle along its heading in fixed increments and
//! reports the first candidate it would overlap. Candidates come from the
//! caller's broad phase; this module does no filtering of its own beyond
//! ignoring obstacles the mover already overlaps.
//!
//! When several candidates overlap at the same step, the first one in list
//! order wins. That is not always the nearest obstacle.
//!
//! The march never runs past the farthest candidate, and never takes more than
//! [`MAX_MARCH_STEPS`] steps: a very long march coarsens its increment
//! instead of growing its step count.

use serde::{Deserialize, Serialize};

use super::collider::ColliderId;
use crate::geometry::{Angle, Edge, RectF, Side, Skew};

/// Smallest march increment accepted; guards against runaway loops
pub const MIN_PRECISION: f32 = 0.01;

/// Upper bound on march steps per prediction, final check excluded
pub const MAX_MARCH_STEPS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitType {
    #[default]
    None,
    Obstacle,
}

/// A broad-phase candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: ColliderId,
    pub bounds: RectF,
}

/// Outcome of a march. Reused across evaluations to avoid allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitPrediction {
    pub hit_type: HitType,
    /// The obstacle struck, if any
    pub obstacle: Option<Obstacle>,
    /// The obstacle side that was struck
    pub side: Option<Side>,
    /// Segment of the struck side
    pub edge: Option<Edge>,
    /// Last known good distance: how far the mover got before the first overlap
    pub lkgd: f32,
    /// Distance that was scanned
    pub visibility: f32,
    /// Heading that was scanned
    pub direction: Angle,
    /// Mover bounds at the start of the march
    pub moving: RectF,
}

impl HitPrediction {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_hit(&self) -> bool {
        self.hit_type == HitType::Obstacle
    }

    /// The struck edge is the obstacle's left or right side
    pub fn struck_vertical_edge(&self) -> bool {
        self.side.is_some_and(Side::is_vertical)
    }
}

/// Predict whether `moving` hits any of `obstacles` within `visibility` along `angle`.
///
/// The result is written into `out` so callers can reuse one prediction buffer.
pub fn predict_hit(
    moving: RectF,
    obstacles: &[Obstacle],
    angle: Angle,
    visibility: f32,
    precision: f32,
    out: &mut HitPrediction,
) {
    out.clear();
    out.direction = angle;
    out.moving = moving;
    out.visibility = visibility;

    if !visibility.is_finite() {
        log::warn!("hit prediction skipped: visibility {visibility} is not finite");
        return;
    }
    if visibility <= 0.0 || obstacles.is_empty() {
        out.lkgd = visibility.max(0.0);
        return;
    }

    // past this distance the mover cannot overlap any candidate
    let limit = visibility.min(reach(&moving, obstacles, angle));
    let precision = precision.max(MIN_PRECISION).max(limit / MAX_MARCH_STEPS as f32);
    let mut last_good = 0.0;
    let mut step: u32 = 1;

    while step <= MAX_MARCH_STEPS {
        let distance = step as f32 * precision;
        if distance >= limit {
            break;
        }
        if probe(moving, obstacles, angle, distance, last_good, out) {
            return;
        }
        last_good = distance;
        step += 1;
    }

    // final check at the end of the scanned range
    if probe(moving, obstacles, angle, limit, last_good, out) {
        return;
    }
    out.lkgd = visibility;
}

/// March distance after which `moving` is clear of every obstacle
fn reach(moving: &RectF, obstacles: &[Obstacle], angle: Angle) -> f32 {
    let cells = obstacles
        .iter()
        .map(|o| moving.center_distance(&o.bounds) + half_diagonal(moving) + half_diagonal(&o.bounds))
        .fold(0.0, f32::max);
    cells / Skew::Normal.factor(angle)
}

fn half_diagonal(rect: &RectF) -> f32 {
    rect.width.hypot(rect.height) / 2.0
}

/// Test the mover at `distance`; on overlap fill `out` and return true
fn probe(
    moving: RectF,
    obstacles: &[Obstacle],
    angle: Angle,
    distance: f32,
    last_good: f32,
    out: &mut HitPrediction,
) -> bool {
    let stepped = moving.offset_by_angle_and_distance(angle, distance, Skew::Normal);
    for obstacle in obstacles {
        if !stepped.overlaps(&obstacle.bounds) || moving.overlaps(&obstacle.bounds) {
            continue;
        }
        let settled = moving.offset_by_angle_and_distance(angle, last_good, Skew::Normal);
        out.hit_type = HitType::Obstacle;
        out.obstacle = Some(*obstacle);
        let side = struck_side(&settled, &obstacle.bounds, angle);
        out.side = Some(side);
        out.edge = Some(obstacle.bounds.edge(side));
        out.lkgd = last_good;
        return true;
    }
    false
}

/// Which side of `obstacle` a mover at `settled` runs into when travelling along `angle`.
///
/// When the mover is clear of the obstacle on both axes (a corner approach),
/// the axis whose gap closes last is the one that was struck.
fn struck_side(settled: &RectF, obstacle: &RectF, angle: Angle) -> Side {
    let dir = angle.to_unit_vector();

    let x_gap = if settled.right() <= obstacle.left {
        Some(obstacle.left - settled.right())
    } else if settled.left >= obstacle.right() {
        Some(settled.left - obstacle.right())
    } else {
        None
    };
    let y_gap = if settled.bottom() <= obstacle.top {
        Some(obstacle.top - settled.bottom())
    } else if settled.top >= obstacle.bottom() {
        Some(settled.top - obstacle.bottom())
    } else {
        None
    };

    let hit_side = match (x_gap, y_gap) {
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (Some(x), Some(y)) => {
            // time to close each gap; the later one decides
            let tx = if dir.x.abs() > f32::EPSILON { x / dir.x.abs() } else { f32::INFINITY };
            let ty = if dir.y.abs() > f32::EPSILON { y / dir.y.abs() } else { f32::INFINITY };
            tx >= ty
        }
        // already overlapping along both axes; fall back to the dominant direction
        (None, None) => dir.x.abs() >= dir.y.abs(),
    };

    if hit_side {
        if settled.center().left <= obstacle.center().left {
            Side::Left
        } else {
            Side::Right
        }
    } else if settled.center().top <= obstacle.center().top {
        Side::Top
    } else {
        Side::Bottom
    }
}
