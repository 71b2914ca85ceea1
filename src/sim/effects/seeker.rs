//! Steering toward a point or another collider

use std::time::Duration;

use super::{Effect, EffectStatus, Governor};
use crate::error::{EngineError, Result};
use crate::geometry::LocF;
use crate::sim::collider::ColliderId;
use crate::sim::group::ColliderGroup;

/// Where a seeker is headed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekGoal {
    Point(LocF),
    /// The center of another registered collider, tracked as it moves
    Collider(ColliderId),
}

/// Re-aims the target at its goal on every run and stops it on arrival
#[derive(Debug, Clone)]
pub struct Seeker {
    target: ColliderId,
    goal: SeekGoal,
    speed: f32,
    close_enough: f32,
    remove_on_arrival: bool,
    arrived: bool,
    governor: Governor,
}

impl Seeker {
    pub fn new(target: ColliderId, goal: SeekGoal, speed: f32, close_enough: f32) -> Result<Self> {
        Ok(Self {
            target,
            goal,
            speed: EngineError::check_speed(speed)?,
            close_enough: EngineError::check_speed(close_enough)?,
            remove_on_arrival: false,
            arrived: false,
            governor: Governor::default(),
        })
    }

    /// Finish the effect the first time the target arrives
    pub fn remove_on_arrival(mut self, remove: bool) -> Self {
        self.remove_on_arrival = remove;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.governor = Governor::new(interval);
        self
    }

    pub fn goal(&self) -> SeekGoal {
        self.goal
    }

    pub fn set_goal(&mut self, goal: SeekGoal) {
        self.goal = goal;
        self.arrived = false;
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }
}

impl Effect for Seeker {
    fn name(&self) -> &'static str {
        "seeker"
    }

    fn target(&self) -> ColliderId {
        self.target
    }

    fn governor(&mut self) -> &mut Governor {
        &mut self.governor
    }

    fn apply(&mut self, group: &mut ColliderGroup, _elapsed: Duration) -> Result<EffectStatus> {
        let Some(bounds) = group.bounds_of(self.target) else {
            return Ok(EffectStatus::Finished);
        };
        let goal = match self.goal {
            SeekGoal::Point(point) => point,
            SeekGoal::Collider(id) => match group.bounds_of(id) {
                Some(b) => b.center(),
                None => {
                    log::debug!("seeker on {}: goal {id} is gone", self.target);
                    if let Some(velocity) = group.velocity_mut(self.target) {
                        velocity.stop();
                    }
                    return Ok(EffectStatus::Finished);
                }
            },
        };
        let Some(velocity) = group.velocity_mut(self.target) else {
            return Ok(EffectStatus::Finished);
        };

        let here = bounds.center();
        if here.distance(goal) <= self.close_enough {
            velocity.stop();
            if !self.arrived {
                log::debug!("seeker on {} arrived at {goal:?}", self.target);
            }
            self.arrived = true;
            return Ok(if self.remove_on_arrival {
                EffectStatus::Finished
            } else {
                EffectStatus::Continue
            });
        }

        self.arrived = false;
        velocity.set_angle(here.angle_to(goal));
        velocity.set_speed(self.speed)?;
        Ok(EffectStatus::Continue)
    }
}
