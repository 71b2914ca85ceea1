//! Per-collider motion state
//!
//! A `Velocity` holds the heading, speed and bounce behaviour of one
//! registered collider, plus the events hosts subscribe to. It never
//! schedules itself: the collider group evaluates it when its adaptive
//! cadence says it is due.

use std::fmt;
use std::time::Duration;

use glam::Vec2;

use super::collider::ColliderId;
use super::event::Event;
use super::hit::{HitPrediction, HitType};
use super::lifetime::Lifetime;
use crate::error::{EngineError, GeometryError, Result};
use crate::geometry::{Angle, Edge, RectF, Side};

/// A collision, as seen by one participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Heading of `mover` at the moment of impact
    pub angle: Angle,
    pub mover: ColliderId,
    pub struck: ColliderId,
    pub hit_type: HitType,
    /// Side of `struck` (for the moving participant) that was hit
    pub side: Option<Side>,
    pub edge: Option<Edge>,
}

impl Impact {
    /// The same collision from the struck collider's point of view
    pub fn mirrored(&self) -> Impact {
        Impact {
            angle: self.angle.opposite(),
            mover: self.struck,
            struck: self.mover,
            hit_type: self.hit_type,
            side: self.side,
            edge: self.edge,
        }
    }
}

/// Fired just before the group moves a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeforeMove {
    pub id: ColliderId,
    pub from: RectF,
    pub angle: Angle,
    pub distance: f32,
}

/// Initial motion for a registration
#[derive(Debug, Clone)]
pub struct MotionOptions {
    pub angle: Angle,
    /// Units per second
    pub speed: f32,
    /// Reflect off obstacles instead of stopping
    pub bounce: bool,
    /// Per-object time multiplier, applied on top of the group's
    pub speed_ratio: f32,
    /// Deregister when this ends
    pub lifetime: Option<Lifetime>,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            angle: Angle::RIGHT,
            speed: 0.0,
            bounce: false,
            speed_ratio: 1.0,
            lifetime: None,
        }
    }
}

/// Reshapes a collider's bounds for hit testing
pub type BoundsTransform = Box<dyn Fn(RectF) -> RectF>;

/// The heading a bouncing mover leaves with after striking `side`
pub fn bounce_angle(angle: Angle, side: Side) -> Angle {
    if side.is_vertical() {
        angle.mirror_horizontally()
    } else {
        angle.mirror_vertically()
    }
}

pub struct Velocity {
    id: ColliderId,
    angle: Angle,
    speed: f32,
    bounce: bool,
    speed_ratio: f32,
    bounds_transform: Option<BoundsTransform>,
    last_evaluated: Duration,
    next_eligible: Duration,
    last_prediction: HitPrediction,
    last_impact: Option<Impact>,

    pub angle_changed: Event<Angle>,
    pub speed_changed: Event<f32>,
    pub before_move: Event<BeforeMove>,
    /// Fired after every evaluation, hit or not. A failed evaluation reports a
    /// cleared prediction.
    pub velocity_enforced: Event<HitPrediction>,
    pub impact_occurred: Event<Impact>,
}

impl Velocity {
    pub(crate) fn new(id: ColliderId, options: &MotionOptions, now: Duration) -> Result<Self> {
        let speed = EngineError::check_speed(options.speed)?;
        let speed_ratio = EngineError::check_speed(options.speed_ratio)?;
        Ok(Self {
            id,
            angle: options.angle,
            speed,
            bounce: options.bounce,
            speed_ratio,
            bounds_transform: None,
            last_evaluated: now,
            next_eligible: now,
            last_prediction: HitPrediction::default(),
            last_impact: None,
            angle_changed: Event::new(),
            speed_changed: Event::new(),
            before_move: Event::new(),
            velocity_enforced: Event::new(),
            impact_occurred: Event::new(),
        })
    }

    pub fn id(&self) -> ColliderId {
        self.id
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn set_angle(&mut self, angle: Angle) {
        if angle != self.angle {
            self.angle = angle;
            self.angle_changed.fire(&angle);
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the speed (units/sec). Negative or non-finite speeds are rejected.
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        let speed = EngineError::check_speed(speed)?;
        if speed != self.speed {
            self.speed = speed;
            self.speed_changed.fire(&speed);
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.speed != 0.0 {
            self.speed = 0.0;
            self.speed_changed.fire(&0.0);
        }
    }

    pub fn bounce(&self) -> bool {
        self.bounce
    }

    pub fn set_bounce(&mut self, bounce: bool) {
        self.bounce = bounce;
    }

    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    pub fn set_speed_ratio(&mut self, ratio: f32) -> Result<()> {
        self.speed_ratio = EngineError::check_speed(ratio)?;
        Ok(())
    }

    /// Hit-test with a shape derived from the visual bounds
    pub fn set_bounds_transform(&mut self, transform: impl Fn(RectF) -> RectF + 'static) {
        self.bounds_transform = Some(Box::new(transform));
    }

    pub fn clear_bounds_transform(&mut self) {
        self.bounds_transform = None;
    }

    pub fn has_bounds_transform(&self) -> bool {
        self.bounds_transform.is_some()
    }

    /// The shape used for hit testing given the collider's current bounds
    pub fn hit_bounds(&self, bounds: RectF) -> RectF {
        match &self.bounds_transform {
            Some(transform) => transform(bounds),
            None => bounds,
        }
    }

    /// Heading and speed as a vector (units/sec, y down)
    pub fn movement_vector(&self) -> Vec2 {
        self.angle.to_unit_vector() * self.speed
    }

    /// Replace heading and speed from a vector. A zero vector keeps the heading.
    pub fn set_movement_vector(&mut self, v: Vec2) -> Result<()> {
        GeometryError::check_finite("movement x", v.x)?;
        GeometryError::check_finite("movement y", v.y)?;
        let speed = v.length();
        if speed > f32::EPSILON {
            self.set_angle(Angle::from_vector(v));
        }
        self.set_speed(speed)
    }

    /// Group time of the last evaluation
    pub fn last_evaluated(&self) -> Duration {
        self.last_evaluated
    }

    /// Group time before which this velocity is skipped
    pub fn next_eligible(&self) -> Duration {
        self.next_eligible
    }

    pub fn last_prediction(&self) -> &HitPrediction {
        &self.last_prediction
    }

    pub fn last_impact(&self) -> Option<&Impact> {
        self.last_impact.as_ref()
    }

    pub(crate) fn is_due(&self, now: Duration) -> bool {
        now >= self.next_eligible
    }

    /// Distance to cover for the time elapsed since the last evaluation
    pub(crate) fn travel_distance(&self, now: Duration, global_ratio: f32) -> f32 {
        let elapsed = now.saturating_sub(self.last_evaluated).as_secs_f32();
        self.speed * elapsed * global_ratio * self.speed_ratio
    }

    /// Note an evaluation (or a skipped idle object) at `now`
    pub(crate) fn mark_evaluated(&mut self, now: Duration, interval: Duration) {
        self.last_evaluated = now;
        self.next_eligible = now + interval;
    }

    pub(crate) fn record_prediction(&mut self, prediction: &HitPrediction) {
        self.last_prediction.clone_from(prediction);
        self.velocity_enforced.fire(prediction);
    }

    /// This velocity struck something: notify, then bounce or stop
    pub(crate) fn resolve_impact(&mut self, impact: Impact) {
        self.last_impact = Some(impact);
        self.impact_occurred.fire(&impact);

        match (self.bounce, impact.side) {
            (true, Some(side)) => self.set_angle(bounce_angle(self.angle, side)),
            (true, None) => self.set_angle(self.angle.opposite()),
            (false, _) => self.stop(),
        }
    }

    /// Something struck this velocity's collider
    pub(crate) fn absorb_impact(&mut self, impact: Impact) {
        self.last_impact = Some(impact);
        self.impact_occurred.fire(&impact);

        if self.bounce {
            if let Some(side) = impact.side {
                self.set_angle(bounce_angle(self.angle, side));
            }
        }
    }
}

impl fmt::Debug for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Velocity")
            .field("id", &self.id)
            .field("angle", &self.angle)
            .field("speed", &self.speed)
            .field("bounce", &self.bounce)
            .field("speed_ratio", &self.speed_ratio)
            .field("bounds_transform", &self.bounds_transform.is_some())
            .field("last_evaluated", &self.last_evaluated)
            .field("next_eligible", &self.next_eligible)
            .finish()
    }
}
