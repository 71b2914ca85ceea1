//! Constant acceleration along a fixed heading

use std::time::Duration;

use super::{Effect, EffectStatus, Governor};
use crate::error::Result;
use crate::geometry::Angle;
use crate::sim::collider::ColliderId;
use crate::sim::group::ColliderGroup;

/// Accelerates the target along `angle`, forever or for `duration`
#[derive(Debug, Clone)]
pub struct Force {
    target: ColliderId,
    angle: Angle,
    /// Units/sec²
    acceleration: f32,
    duration: Option<Duration>,
    applied_for: Duration,
    governor: Governor,
}

impl Force {
    pub fn new(target: ColliderId, angle: Angle, acceleration: f32, duration: Option<Duration>) -> Self {
        Self {
            target,
            angle,
            acceleration,
            duration,
            applied_for: Duration::ZERO,
            governor: Governor::default(),
        }
    }

    /// Unbounded downward force
    pub fn gravity(target: ColliderId, acceleration: f32) -> Self {
        Self::new(target, Angle::DOWN, acceleration, None)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.governor = Governor::new(interval);
        self
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    fn is_spent(&self) -> bool {
        self.duration.is_some_and(|d| self.applied_for >= d)
    }
}

impl Effect for Force {
    fn name(&self) -> &'static str {
        "force"
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

        // never push past the end of a bounded force
        let dt = match self.duration {
            Some(d) => elapsed.min(d.saturating_sub(self.applied_for)),
            None => elapsed,
        };
        self.applied_for += elapsed;

        if !dt.is_zero() {
            let impulse = self.angle.to_unit_vector() * (self.acceleration * dt.as_secs_f32());
            velocity.set_movement_vector(velocity.movement_vector() + impulse)?;
        }

        Ok(if self.is_spent() {
            EffectStatus::Finished
        } else {
            EffectStatus::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectF;
    use crate::sim::collider::SimpleCollider;
    use crate::sim::effects::Effects;
    use crate::sim::velocity::MotionOptions;

    #[test]
    fn test_force_composes_with_motion() {
        let mut group = ColliderGroup::with_defaults();
        let a = SimpleCollider::new(1, RectF::new(0.0, 0.0, 1.0, 1.0)).shared();
        let id = group
            .register(&a, MotionOptions {
                angle: Angle::RIGHT,
                speed: 10.0,
                ..Default::default()
            })
            .unwrap();

        let mut force = Force::new(id, Angle::DOWN, 100.0, None);
        assert_eq!(force.apply(&mut group, Duration::from_millis(100)).unwrap(), EffectStatus::Continue);

        let v = group.velocity(id).unwrap();
        // 10 right + 10 down
        assert!((v.angle().degrees() - 45.0).abs() < 1e-3);
        assert!((v.speed() - 200f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_bounded_force_finishes() {
        let mut group = ColliderGroup::with_defaults();
        let a = SimpleCollider::new(1, RectF::new(0.0, 0.0, 1.0, 1.0)).shared();
        let id = group.register(&a, MotionOptions::default()).unwrap();

        let mut force = Force::new(id, Angle::RIGHT, 10.0, Some(Duration::from_millis(150)));
        assert_eq!(force.apply(&mut group, Duration::from_millis(100)).unwrap(), EffectStatus::Continue);
        assert_eq!(force.apply(&mut group, Duration::from_millis(100)).unwrap(), EffectStatus::Finished);
        // only 150ms worth of acceleration was applied
        assert!((group.velocity(id).unwrap().speed() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_gravity_accelerates_downward() {
        let mut group = ColliderGroup::with_defaults();
        let a = SimpleCollider::new(1, RectF::new(0.0, 0.0, 1.0, 1.0)).shared();
        let id = group.register(&a, MotionOptions::default()).unwrap();

        let mut effects = Effects::new();
        effects.add(Force::gravity(id, 20.0));
        for _ in 0..20 {
            group.tick(Duration::from_millis(50));
            effects.run(&mut group);
        }

        let v = group.velocity(id).unwrap();
        assert!((v.angle().degrees() - 90.0).abs() < 1e-3);
        assert!(v.speed() > 15.0, "speed was {}", v.speed());
        assert!(a.borrow().bounds().top > 0.0);
        assert_eq!(effects.len(), 1);
    }
}
