//! Effects: periodic behaviors that steer a velocity
//!
//! An effect targets one registered collider and nudges its velocity on its
//! own schedule. Schedules run on the group clock, so effects freeze while the
//! group is paused. Drive them with [`Effects::run`] after each
//! [`ColliderGroup::tick`].

pub mod floater;
pub mod force;
pub mod friction;
pub mod roamer;
pub mod seeker;

pub use floater::Floater;
pub use force::Force;
pub use friction::Friction;
pub use roamer::Roamer;
pub use seeker::{SeekGoal, Seeker};

use std::time::Duration;

use super::collider::ColliderId;
use super::group::{ColliderGroup, GroupState};
use crate::consts::EFFECT_INTERVAL_MS;
use crate::error::Result;

/// Whether an effect wants to keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStatus {
    Continue,
    Finished,
}

/// Rate limiter for an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Governor {
    interval: Duration,
    last: Option<Duration>,
}

impl Governor {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time since the previous run if the effect is due at `now`.
    ///
    /// The first poll is always due and reports zero elapsed time.
    pub fn poll(&mut self, now: Duration) -> Option<Duration> {
        match self.last {
            None => {
                self.last = Some(now);
                Some(Duration::ZERO)
            }
            Some(last) if now.saturating_sub(last) >= self.interval => {
                self.last = Some(now);
                Some(now - last)
            }
            Some(_) => None,
        }
    }
}

impl Default for Governor {
    fn default() -> Self {
        Self::new(Duration::from_millis(EFFECT_INTERVAL_MS))
    }
}

pub trait Effect {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// The collider whose velocity this effect steers
    fn target(&self) -> ColliderId;

    fn governor(&mut self) -> &mut Governor;

    /// Run once. `elapsed` is the group time since the previous run.
    fn apply(&mut self, group: &mut ColliderGroup, elapsed: Duration) -> Result<EffectStatus>;
}

/// A set of effects run together
#[derive(Default)]
pub struct Effects {
    effects: Vec<Box<dyn Effect>>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: impl Effect + 'static) {
        self.effects.push(Box::new(effect));
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run every due effect against `group`; returns how many ran.
    ///
    /// Effects that finish, fail, or whose target is no longer registered are dropped.
    pub fn run(&mut self, group: &mut ColliderGroup) -> usize {
        if group.state() == GroupState::Disposed {
            self.effects.clear();
            return 0;
        }
        if group.pause_signal().is_paused() {
            return 0;
        }

        let now = group.now();
        let mut ran = 0;
        self.effects.retain_mut(|effect| {
            let target = effect.target();
            if !group.contains(target) {
                log::debug!("{} on {target} dropped: target deregistered", effect.name());
                return false;
            }
            let Some(elapsed) = effect.governor().poll(now) else {
                return true;
            };
            ran += 1;
            match effect.apply(group, elapsed) {
                Ok(EffectStatus::Continue) => true,
                Ok(EffectStatus::Finished) => {
                    log::debug!("{} on {target} finished", effect.name());
                    false
                }
                Err(err) => {
                    log::warn!("{} on {target} failed: {err}", effect.name());
                    false
                }
            }
        });
        ran
    }
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.effects.iter().map(|e| e.name()))
            .finish()
    }
}
