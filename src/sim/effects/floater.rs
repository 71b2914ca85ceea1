//! Bobbing drift

use std::time::Duration;

use glam::Vec2;

use super::{Effect, EffectStatus, Governor};
use crate::error::{EngineError, Result};
use crate::geometry::Angle;
use crate::sim::collider::ColliderId;
use crate::sim::group::ColliderGroup;

/// Alternates up and down nudges of `amplitude`, taking back the previous one
/// each time, so the target bobs without gaining speed overall
#[derive(Debug, Clone)]
pub struct Floater {
    target: ColliderId,
    amplitude: f32,
    rising: bool,
    previous: Vec2,
    governor: Governor,
}

impl Floater {
    pub fn new(target: ColliderId, amplitude: f32) -> Result<Self> {
        Ok(Self {
            target,
            amplitude: EngineError::check_speed(amplitude)?,
            rising: true,
            previous: Vec2::ZERO,
            governor: Governor::new(Duration::from_millis(500)),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.governor = Governor::new(interval);
        self
    }
}

impl Effect for Floater {
    fn name(&self) -> &'static str {
        "floater"
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

        let heading = if self.rising { Angle::UP } else { Angle::DOWN };
        let impulse = heading.to_unit_vector() * self.amplitude;
        velocity.set_movement_vector(velocity.movement_vector() - self.previous + impulse)?;
        self.previous = impulse;
        self.rising = !self.rising;
        Ok(EffectStatus::Continue)
    }
}
