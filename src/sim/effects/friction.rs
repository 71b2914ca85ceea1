//! Speed decay

use std::time::Duration;

use super::{Effect, EffectStatus, Governor};
use crate::error::{EngineError, Result};
use crate::sim::collider::ColliderId;
use crate::sim::group::ColliderGroup;

/// Multiplies the target's speed by `decay` every second, stopping it once it
/// drops below `stop_below`
#[derive(Debug, Clone)]
pub struct Friction {
    target: ColliderId,
    decay: f32,
    stop_below: f32,
    governor: Governor,
}

impl Friction {
    /// `decay` is the fraction of speed kept per second, in `[0, 1]`
    pub fn new(target: ColliderId, decay: f32, stop_below: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&decay) {
            return Err(EngineError::InvalidSetting {
                name: "decay",
                value: decay as f64,
                reason: "must be within [0, 1]",
            });
        }
        let stop_below = EngineError::check_speed(stop_below)?;
        Ok(Self {
            target,
            decay,
            stop_below,
            governor: Governor::default(),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.governor = Governor::new(interval);
        self
    }
}

impl Effect for Friction {
    fn name(&self) -> &'static str {
        "friction"
    }

    fn target(&self) -> ColliderId {
        self.target
    }

    fn governor(&mut self) -> &mut Governor {
        &mut self.governor
    }

    fn apply(&mut self, group: &mut ColliderGroup, elapsed: Duration) -> Result<EffectStatus> {
        let Some(velocity) = group.velocity_mut(self.target) else {
            return Ok(EffectStatus::Finished);
        };
        let speed = velocity.speed();
        if speed == 0.0 || elapsed.is_zero() {
            return Ok(EffectStatus::Continue);
        }

        let slowed = speed * self.decay.powf(elapsed.as_secs_f32());
        if slowed < self.stop_below {
            velocity.stop();
        } else {
            velocity.set_speed(slowed)?;
        }
        Ok(EffectStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Angle, RectF};
    use crate::sim::collider::SimpleCollider;
    use crate::sim::velocity::MotionOptions;

    fn setup(speed: f32) -> (ColliderGroup, ColliderId, crate::sim::collider::SharedCollider) {
        let mut group = ColliderGroup::with_defaults();
        let a = SimpleCollider::new(1, RectF::new(0.0, 0.0, 1.0, 1.0)).shared();
        let id = group
            .register(&a, MotionOptions {
                angle: Angle::RIGHT,
                speed,
                ..Default::default()
            })
            .unwrap();
        (group, id, a)
    }

    #[test]
    fn test_decays_per_second() {
        let (mut group, id, _a) = setup(10.0);
        let mut friction = Friction::new(id, 0.5, 0.1).unwrap();
        friction.apply(&mut group, Duration::from_secs(1)).unwrap();
        assert!((group.velocity(id).unwrap().speed() - 5.0).abs() < 1e-4);
        friction.apply(&mut group, Duration::from_millis(500)).unwrap();
        assert!((group.velocity(id).unwrap().speed() - 5.0 * 0.5f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_snaps_to_zero() {
        let (mut group, id, _a) = setup(1.0);
        let mut friction = Friction::new(id, 0.1, 0.5).unwrap();
        friction.apply(&mut group, Duration::from_secs(1)).unwrap();
        assert_eq!(group.velocity(id).unwrap().speed(), 0.0);
        assert_eq!(
            friction.apply(&mut group, Duration::from_secs(1)).unwrap(),
            EffectStatus::Continue
        );
    }

    #[test]
    fn test_rejects_bad_decay() {
        let id = ColliderId::new(0, 0);
        assert!(Friction::new(id, 1.5, 0.1).is_err());
        assert!(Friction::new(id, f32::NAN, 0.1).is_err());
        assert!(Friction::new(id, 0.5, -1.0).is_err());
    }
}
