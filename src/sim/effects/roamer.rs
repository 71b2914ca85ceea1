//! Seeded wandering

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Effect, EffectStatus, Governor};
use crate::error::{EngineError, Result};
use crate::sim::collider::ColliderId;
use crate::sim::group::ColliderGroup;

/// Nudges the target onto a new heading near its current one on every run.
///
/// Each run first takes back the previous nudge, so the target drifts around
/// instead of accelerating without bound.
#[derive(Debug, Clone)]
pub struct Roamer {
    target: ColliderId,
    /// Largest change of heading per run, in degrees
    max_turn: f32,
    magnitude: f32,
    rng: Pcg32,
    previous: Vec2,
    governor: Governor,
}

impl Roamer {
    pub fn new(target: ColliderId, max_turn: f32, magnitude: f32, seed: u64) -> Result<Self> {
        if !(max_turn.is_finite() && (0.0..=180.0).contains(&max_turn)) {
            return Err(EngineError::InvalidSetting {
                name: "max_turn",
                value: max_turn as f64,
                reason: "must be within [0, 180] degrees",
            });
        }
        Ok(Self {
            target,
            max_turn,
            magnitude: EngineError::check_speed(magnitude)?,
            rng: Pcg32::seed_from_u64(seed),
            previous: Vec2::ZERO,
            governor: Governor::new(Duration::from_millis(250)),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.governor = Governor::new(interval);
        self
    }
}

impl Effect for Roamer {
    fn name(&self) -> &'static str {
        "roamer"
    }

    fn target(&self) -> ColliderId {
        self.target
    }

    fn governor(&mut self) -> &mut Governor {
        &mut self.governor
    }

    fn apply(&mut self, group: &mut ColliderGroup, _elapsed: Duration) -> Result<EffectStatus> {
        let Some(velocity) = group.velocity_mut(self.target) else {
            return Ok(EffectStatus::Finished);
        };

        let turn = if self.max_turn > 0.0 {
            self.rng.random_range(-self.max_turn..=self.max_turn)
        } else {
            0.0
        };
        let impulse = velocity.angle().add(turn).to_unit_vector() * self.magnitude;
        velocity.set_movement_vector(velocity.movement_vector() - self.previous + impulse)?;
        self.previous = impulse;
        Ok(EffectStatus::Continue)
    }
}
