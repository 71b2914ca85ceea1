//! The collider group
//!
//! Registry of (collider, velocity) pairs plus the tick that moves them.
//! Each tick:
//! - advances the group clock by `dt` (unless the pause signal is set)
//! - drops registrations whose collider or lifetime has ended
//! - evaluates every moving velocity whose cadence says it is due:
//!   gather obstacles, predict a hit, then move or resolve the collision
//!
//! Slots are visited in index order, not registration order. Two colliders
//! that strike each other in the same tick are resolved in whichever order
//! their slots come up, so simultaneous two-body collisions can come out
//! asymmetric.
//!
//! Everything runs on the caller's thread. Hosts may change a velocity
//! between ticks through [`ColliderGroup::velocity_mut`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::collider::{Collider, ColliderId, SharedCollider};
use super::event::{Event, ListenerId};
use super::hit::{self, HitPrediction, HitType, Obstacle};
use super::lifetime::Lifetime;
use super::pause::PauseSignal;
use super::velocity::{BeforeMove, Impact, MotionOptions, Velocity};
use crate::error::{EngineError, GeometryError, Result};
use crate::geometry::{RectF, Skew};
use crate::settings::EngineSettings;

/// Lifecycle of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// No registrations
    Idle,
    /// At least one registration
    Running,
    /// Lifetime ended; ticks do nothing and registration fails
    Disposed,
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The pause signal was set; nothing happened
    pub paused: bool,
    /// Velocities evaluated
    pub evaluated: usize,
    /// Colliders whose bounds changed
    pub moved: usize,
    /// Collisions resolved
    pub impacts: usize,
    /// Registrations dropped because their collider or lifetime ended
    pub removed: usize,
    /// Evaluations abandoned because of malformed bounds or a non-finite travel distance
    pub failed: usize,
}

struct Slot {
    id: ColliderId,
    identity: u64,
    collider: Weak<RefCell<dyn Collider>>,
    velocity: Velocity,
    lifetime: Option<Lifetime>,
}

struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

pub struct ColliderGroup {
    settings: EngineSettings,
    pause: PauseSignal,
    lifetime: Lifetime,
    state: GroupState,
    /// Group clock; only advances while unpaused
    now: Duration,
    speed_ratio: f32,

    entries: Vec<Entry>,
    free: Vec<u32>,
    by_identity: HashMap<u64, ColliderId>,
    live: usize,

    // Scratch buffers reused every tick, never handed out
    obstacles: Vec<Obstacle>,
    prediction: HitPrediction,
    doomed: Vec<ColliderId>,

    impacts: Vec<Impact>,
    impact_occurred: Event<Impact>,
}

impl ColliderGroup {
    /// Create a group bound to `lifetime` and driven by `pause`
    pub fn new(settings: EngineSettings, pause: PauseSignal, lifetime: Lifetime) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings, pause, lifetime))
    }

    /// Default settings, a private pause signal and lifetime
    pub fn with_defaults() -> Self {
        Self::build(EngineSettings::default(), PauseSignal::new(), Lifetime::new())
    }

    /// `settings` must already be valid
    fn build(settings: EngineSettings, pause: PauseSignal, lifetime: Lifetime) -> Self {
        let capacity = settings.max_colliders;
        Self {
            speed_ratio: settings.speed_ratio,
            settings,
            pause,
            lifetime,
            state: GroupState::Idle,
            now: Duration::ZERO,
            entries: Vec::new(),
            free: Vec::new(),
            by_identity: HashMap::new(),
            live: 0,
            obstacles: Vec::with_capacity(capacity),
            prediction: HitPrediction::default(),
            doomed: Vec::new(),
            impacts: Vec::new(),
            impact_occurred: Event::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Group clock (time spent unpaused)
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pause_signal(&self) -> &PauseSignal {
        &self.pause
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    /// Slow down (< 1) or speed up (> 1) the whole simulation
    pub fn set_speed_ratio(&mut self, ratio: f32) -> Result<()> {
        self.speed_ratio = EngineError::check_speed(ratio)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Start tracking `collider`. The group keeps only a weak reference.
    pub fn register(&mut self, collider: &SharedCollider, options: MotionOptions) -> Result<ColliderId> {
        if self.state == GroupState::Disposed || self.lifetime.is_ended() {
            return Err(EngineError::Disposed);
        }

        let (identity, bounds) = {
            let c = collider.borrow();
            (c.identity(), c.bounds())
        };
        bounds.validate()?;

        if self.by_identity.contains_key(&identity) {
            log::warn!("rejected duplicate registration of collider {identity:#x}");
            return Err(EngineError::AlreadyRegistered { identity });
        }
        if self.live >= self.settings.max_colliders {
            log::warn!(
                "rejected collider {identity:#x}: capacity of {} reached",
                self.settings.max_colliders
            );
            return Err(EngineError::CapacityExceeded {
                max: self.settings.max_colliders,
            });
        }

        let index = self
            .free
            .last()
            .copied()
            .unwrap_or(self.entries.len() as u32);
        let generation = self
            .entries
            .get(index as usize)
            .map_or(0, |e| e.generation);
        let id = ColliderId::new(index, generation);
        let velocity = Velocity::new(id, &options, self.now)?;

        let slot = Slot {
            id,
            identity,
            collider: Rc::downgrade(collider),
            velocity,
            lifetime: options.lifetime,
        };
        if self.free.pop().is_some() {
            self.entries[index as usize].slot = Some(slot);
        } else {
            self.entries.push(Entry {
                generation,
                slot: Some(slot),
            });
        }

        self.by_identity.insert(identity, id);
        self.live += 1;
        self.refresh_state();
        log::debug!("registered collider {identity:#x} as {id} at {bounds:?}");
        Ok(id)
    }

    /// Stop tracking `id`. Unknown or already removed ids return false.
    pub fn deregister(&mut self, id: ColliderId) -> bool {
        let Some(entry) = self.entries.get_mut(id.index() as usize) else {
            return false;
        };
        if entry.generation != id.generation() {
            return false;
        }
        let Some(slot) = entry.slot.take() else {
            return false;
        };
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index());
        self.by_identity.remove(&slot.identity);
        self.live -= 1;
        self.refresh_state();
        log::debug!("deregistered collider {:#x} ({id})", slot.identity);
        true
    }

    /// Stop tracking whichever registration has this collider's identity
    pub fn deregister_collider(&mut self, collider: &dyn Collider) -> bool {
        match self.id_of(collider.identity()) {
            Some(id) => self.deregister(id),
            None => false,
        }
    }

    pub fn id_of(&self, identity: u64) -> Option<ColliderId> {
        self.by_identity.get(&identity).copied()
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.slot(id).is_some()
    }

    /// Registered ids in slot order
    pub fn ids(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.slot.as_ref().map(|s| s.id))
    }

    pub fn velocity(&self, id: ColliderId) -> Option<&Velocity> {
        self.slot(id).map(|s| &s.velocity)
    }

    pub fn velocity_mut(&mut self, id: ColliderId) -> Option<&mut Velocity> {
        self.slot_mut(id).map(|s| &mut s.velocity)
    }

    /// The tracked collider, if its host still holds it
    pub fn collider(&self, id: ColliderId) -> Option<SharedCollider> {
        self.slot(id).and_then(|s| s.collider.upgrade())
    }

    pub fn bounds_of(&self, id: ColliderId) -> Option<RectF> {
        self.collider(id).map(|c| c.borrow().bounds())
    }

    /// Subscribe to every impact in the group
    pub fn on_impact(&mut self, listener: impl FnMut(&Impact) + 'static) -> ListenerId {
        self.impact_occurred.subscribe(listener)
    }

    pub fn remove_impact_listener(&mut self, id: ListenerId) -> bool {
        self.impact_occurred.unsubscribe(id)
    }

    /// Impacts produced by the most recent unpaused tick
    pub fn impacts(&self) -> &[Impact] {
        &self.impacts
    }

    /// End the group's lifetime and drop every registration
    pub fn dispose(&mut self) {
        if self.state == GroupState::Disposed {
            return;
        }
        self.lifetime.end();
        self.entries.clear();
        self.free.clear();
        self.by_identity.clear();
        self.obstacles.clear();
        self.impacts.clear();
        self.live = 0;
        self.state = GroupState::Disposed;
        log::info!("collider group disposed at {:?}", self.now);
    }

    /// Advance the simulation by `dt` of wall-clock time
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        if self.state == GroupState::Disposed {
            return report;
        }
        if self.lifetime.is_ended() {
            self.dispose();
            return report;
        }
        if self.pause.is_paused() {
            report.paused = true;
            return report;
        }

        self.now += dt;
        self.impacts.clear();
        report.removed = self.prune();

        for index in 0..self.entries.len() {
            self.evaluate(index, &mut report);
        }

        log::trace!("tick at {:?}: {:?}", self.now, report);
        report
    }

    fn slot(&self, id: ColliderId) -> Option<&Slot> {
        self.entries
            .get(id.index() as usize)
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.slot.as_ref())
    }

    fn slot_mut(&mut self, id: ColliderId) -> Option<&mut Slot> {
        self.entries
            .get_mut(id.index() as usize)
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.slot.as_mut())
    }

    fn refresh_state(&mut self) {
        if self.state == GroupState::Disposed {
            return;
        }
        let next = if self.live == 0 {
            GroupState::Idle
        } else {
            GroupState::Running
        };
        if next != self.state {
            log::debug!("collider group {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Drop registrations whose collider was released or whose lifetime ended
    fn prune(&mut self) -> usize {
        self.doomed.clear();
        for slot in self.entries.iter().filter_map(|e| e.slot.as_ref()) {
            let released = slot.collider.strong_count() == 0;
            let ended = slot.lifetime.as_ref().is_some_and(Lifetime::is_ended);
            if released || ended {
                self.doomed.push(slot.id);
            }
        }
        let doomed = std::mem::take(&mut self.doomed);
        let removed = doomed.iter().filter(|id| self.deregister(**id)).count();
        self.doomed = doomed;
        removed
    }

    fn evaluate(&mut self, index: usize, report: &mut TickReport) {
        let now = self.now;

        let (id, collider, angle, travel) = {
            let Some(slot) = self.entries[index].slot.as_mut() else {
                return;
            };
            let Some(collider) = slot.collider.upgrade() else {
                return;
            };
            let velocity = &mut slot.velocity;
            if velocity.speed() == 0.0 {
                // idle time is never integrated once the object starts moving
                velocity.mark_evaluated(now, Duration::ZERO);
                return;
            }
            if !velocity.is_due(now) {
                return;
            }
            let travel = velocity.travel_distance(now, self.speed_ratio);
            (slot.id, collider, velocity.angle(), travel)
        };
        report.evaluated += 1;

        let (bounds, mass_bounds) = {
            let c = collider.borrow();
            (c.bounds(), c.mass_bounds())
        };
        let Some(hit_bounds) = self.slot(id).map(|s| s.velocity.hit_bounds(bounds)) else {
            return;
        };
        let visibility = travel * self.settings.lookahead;
        let checked = bounds
            .validate()
            .and(hit_bounds.validate())
            .and(GeometryError::check_finite("travel", travel).map(drop))
            .and(GeometryError::check_finite("visibility", visibility).map(drop));
        if let Err(err) = checked {
            log::warn!("{id}: evaluation skipped: {err}");
            self.fail_evaluation(index, report);
            return;
        }

        self.gather_obstacles(index, &collider, mass_bounds.union(&hit_bounds), visibility);
        hit::predict_hit(
            hit_bounds,
            &self.obstacles,
            angle,
            visibility,
            self.settings.step_precision,
            &mut self.prediction,
        );

        let struck = if self.prediction.is_hit() && self.prediction.lkgd <= travel {
            self.prediction.obstacle
        } else {
            None
        };
        let distance = match struck {
            Some(_) => (self.prediction.lkgd - self.settings.impact_backoff).max(0.0),
            None => travel,
        };

        if let Some(slot) = self.entries[index].slot.as_mut() {
            slot.velocity.before_move.fire(&BeforeMove {
                id,
                from: bounds,
                angle,
                distance,
            });
        }
        if distance > 0.0 {
            let moved = bounds.offset_by_angle_and_distance(angle, distance, Skew::Normal);
            collider.borrow_mut().set_bounds(moved);
            report.moved += 1;
        }

        if let Some(obstacle) = struck {
            let impact = Impact {
                angle,
                mover: id,
                struck: obstacle.id,
                hit_type: HitType::Obstacle,
                side: self.prediction.side,
                edge: self.prediction.edge,
            };
            if let Some(slot) = self.slot_mut(id) {
                slot.velocity.resolve_impact(impact);
            }
            if let Some(other) = self.slot_mut(obstacle.id) {
                other.velocity.absorb_impact(impact.mirrored());
            }
            log::debug!("{id} struck {} heading {angle}", obstacle.id);
            self.impacts.push(impact);
            self.impact_occurred.fire(&impact);
            report.impacts += 1;
        }

        if let Some(slot) = self.entries[index].slot.as_mut() {
            slot.velocity.record_prediction(&self.prediction);
            let interval = self.settings.evaluation_interval(slot.velocity.speed());
            slot.velocity.mark_evaluated(now, interval);
        }
    }

    /// Count an abandoned evaluation. The collider stays where it is, listeners
    /// see a cleared prediction and the cadence still advances.
    fn fail_evaluation(&mut self, index: usize, report: &mut TickReport) {
        report.failed += 1;
        self.prediction.clear();
        if let Some(slot) = self.entries[index].slot.as_mut() {
            slot.velocity.record_prediction(&self.prediction);
            let interval = self.settings.evaluation_interval(slot.velocity.speed());
            slot.velocity.mark_evaluated(self.now, interval);
        }
    }

    /// Fill the obstacle buffer with every other collider the mover may hit.
    ///
    /// The buffer was sized to `max_colliders` and registration never exceeds
    /// that, so it does not grow here.
    fn gather_obstacles(&mut self, mover_index: usize, mover: &SharedCollider, reach: RectF, visibility: f32) {
        self.obstacles.clear();
        let mover = mover.borrow();
        for (index, entry) in self.entries.iter().enumerate() {
            if index == mover_index {
                continue;
            }
            let Some(slot) = entry.slot.as_ref() else {
                continue;
            };
            let Some(other) = slot.collider.upgrade() else {
                continue;
            };
            let other = other.borrow();
            if !mover.can_collide_with(&*other) {
                continue;
            }
            if reach.distance(&other.mass_bounds()) > visibility {
                continue;
            }
            self.obstacles.push(Obstacle {
                id: slot.id,
                bounds: other.bounds(),
            });
        }
    }
}

impl Default for ColliderGroup {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Angle;
    use crate::sim::collider::SimpleCollider;

    fn group() -> ColliderGroup {
        ColliderGroup::with_defaults()
    }

    fn unit(identity: u64, left: f32, top: f32) -> SharedCollider {
        SimpleCollider::new(identity, RectF::new(left, top, 1.0, 1.0)).shared()
    }

    fn moving(angle: Angle, speed: f32) -> MotionOptions {
        MotionOptions {
            angle,
            speed,
            ..Default::default()
        }
    }

    fn run(group: &mut ColliderGroup, ticks: usize, dt_ms: u64) {
        for _ in 0..ticks {
            group.tick(Duration::from_millis(dt_ms));
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut g = group();
        assert_eq!(g.state(), GroupState::Idle);
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, MotionOptions::default()).unwrap();
        assert_eq!(g.state(), GroupState::Running);
        assert!(g.deregister(id));
        assert_eq!(g.state(), GroupState::Idle);
        g.dispose();
        assert_eq!(g.state(), GroupState::Disposed);
        assert!(matches!(
            g.register(&a, MotionOptions::default()),
            Err(EngineError::Disposed)
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        g.register(&a, MotionOptions::default()).unwrap();
        assert!(matches!(
            g.register(&a, MotionOptions::default()),
            Err(EngineError::AlreadyRegistered { identity: 1 })
        ));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_double_deregister_is_idempotent() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, MotionOptions::default()).unwrap();
        assert!(g.deregister(id));
        assert!(!g.deregister(id));
        assert!(!g.deregister_collider(&*a.borrow()));
        assert!(g.is_empty());
    }

    #[test]
    fn test_stale_id_does_not_resolve_to_reused_slot() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let b = unit(2, 5.0, 0.0);
        let old = g.register(&a, MotionOptions::default()).unwrap();
        g.deregister(old);
        let new = g.register(&b, MotionOptions::default()).unwrap();
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(g.velocity(old).is_none());
        assert!(g.velocity(new).is_some());
        assert!(!g.deregister(old));
        assert_eq!(g.id_of(2), Some(new));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let settings = EngineSettings {
            max_colliders: 2,
            ..Default::default()
        };
        let mut g = ColliderGroup::new(settings, PauseSignal::new(), Lifetime::new()).unwrap();
        let colliders: Vec<_> = (0..3).map(|i| unit(i, i as f32 * 3.0, 0.0)).collect();
        g.register(&colliders[0], MotionOptions::default()).unwrap();
        g.register(&colliders[1], MotionOptions::default()).unwrap();
        assert!(matches!(
            g.register(&colliders[2], MotionOptions::default()),
            Err(EngineError::CapacityExceeded { max: 2 })
        ));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_registration_validates_input() {
        let mut g = group();
        let bad = SimpleCollider::new(1, RectF::new(f32::NAN, 0.0, 1.0, 1.0)).shared();
        assert!(matches!(
            g.register(&bad, MotionOptions::default()),
            Err(EngineError::Geometry(_))
        ));
        let ok = unit(2, 0.0, 0.0);
        assert!(matches!(
            g.register(&ok, moving(Angle::RIGHT, -1.0)),
            Err(EngineError::InvalidSpeed { .. })
        ));
        assert!(g.is_empty());
        assert!(g.id_of(2).is_none());
    }

    #[test]
    fn test_moves_in_open_space() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        run(&mut g, 10, 100);
        assert!((a.borrow().bounds().left - 10.0).abs() < 1e-3);
        assert_eq!(a.borrow().bounds().top, 0.0);
    }

    #[test]
    fn test_slow_objects_are_evaluated_less_often() {
        let mut g = group();
        let slow = unit(1, 0.0, 0.0);
        let fast = unit(2, 0.0, 10.0);
        let slow_id = g.register(&slow, moving(Angle::RIGHT, 1.0)).unwrap();
        let fast_id = g.register(&fast, moving(Angle::RIGHT, 120.0)).unwrap();

        let mut slow_evals = 0;
        let mut fast_evals = 0;
        for _ in 0..50 {
            let before = (
                g.velocity(slow_id).unwrap().last_evaluated(),
                g.velocity(fast_id).unwrap().last_evaluated(),
            );
            g.tick(Duration::from_millis(10));
            if g.velocity(slow_id).unwrap().last_evaluated() != before.0 {
                slow_evals += 1;
            }
            if g.velocity(fast_id).unwrap().last_evaluated() != before.1 {
                fast_evals += 1;
            }
        }
        assert!(slow_evals <= 6, "slow evaluated {slow_evals} times");
        assert!(fast_evals >= 15, "fast evaluated {fast_evals} times");
    }

    #[test]
    fn test_stops_short_of_obstacle_without_bounce() {
        let mut g = group();
        let mover = unit(1, 0.0, 0.0);
        let wall = SimpleCollider::new(2, RectF::new(5.0, -5.0, 1.0, 10.0)).shared();
        let id = g.register(&mover, moving(Angle::RIGHT, 10.0)).unwrap();
        let wall_id = g.register(&wall, MotionOptions::default()).unwrap();

        run(&mut g, 20, 100);

        let bounds = mover.borrow().bounds();
        assert!(bounds.right() <= 5.0, "mover overlapped the wall: {bounds:?}");
        assert!(bounds.right() > 3.5);
        let v = g.velocity(id).unwrap();
        assert_eq!(v.speed(), 0.0);
        let impact = v.last_impact().unwrap();
        assert_eq!(impact.struck, wall_id);
        // the wall saw the mirrored impact
        let mirrored = g.velocity(wall_id).unwrap().last_impact().unwrap();
        assert_eq!(mirrored.mover, wall_id);
        assert_eq!(mirrored.angle, Angle::LEFT);
    }

    #[test]
    fn test_bounces_between_walls() {
        let mut g = group();
        let ball = unit(1, 5.0, 0.0);
        let left = SimpleCollider::new(2, RectF::new(0.0, -5.0, 1.0, 10.0)).shared();
        let right = SimpleCollider::new(3, RectF::new(10.0, -5.0, 1.0, 10.0)).shared();
        let id = g
            .register(&ball, MotionOptions {
                angle: Angle::RIGHT,
                speed: 20.0,
                bounce: true,
                ..Default::default()
            })
            .unwrap();
        g.register(&left, MotionOptions::default()).unwrap();
        g.register(&right, MotionOptions::default()).unwrap();

        let impacts = Rc::new(RefCell::new(0));
        let counter = impacts.clone();
        g.on_impact(move |_| *counter.borrow_mut() += 1);

        run(&mut g, 100, 25);

        let bounds = ball.borrow().bounds();
        assert!(bounds.left >= 1.0 && bounds.right() <= 10.0, "escaped: {bounds:?}");
        assert!(*impacts.borrow() >= 2);
        assert_eq!(g.velocity(id).unwrap().speed(), 20.0);
    }

    #[test]
    fn test_layers_let_projectiles_pass_each_other() {
        const SHOT: u32 = 0b10;
        const WALL: u32 = 0b01;
        let mut g = group();
        let a = SimpleCollider::new(1, RectF::new(0.0, 0.0, 1.0, 1.0))
            .with_layers(SHOT, WALL)
            .shared();
        let b = SimpleCollider::new(2, RectF::new(4.0, 0.0, 1.0, 1.0))
            .with_layers(SHOT, WALL)
            .shared();
        g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        g.register(&b, MotionOptions::default()).unwrap();

        run(&mut g, 10, 100);
        assert!((a.borrow().bounds().left - 10.0).abs() < 1e-3);
        assert!(g.impacts().is_empty());
    }

    #[test]
    fn test_two_movers_collide_and_both_bounce() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let b = unit(2, 10.0, 0.0);
        let bouncy = |angle| MotionOptions {
            angle,
            speed: 10.0,
            bounce: true,
            ..Default::default()
        };
        let a_id = g.register(&a, bouncy(Angle::RIGHT)).unwrap();
        let b_id = g.register(&b, bouncy(Angle::LEFT)).unwrap();

        run(&mut g, 10, 100);

        let va = g.velocity(a_id).unwrap();
        let vb = g.velocity(b_id).unwrap();
        assert_eq!(va.angle(), Angle::LEFT);
        assert_eq!(vb.angle(), Angle::RIGHT);
        assert!(!a.borrow().bounds().overlaps(&b.borrow().bounds()));
    }

    #[test]
    fn test_bounds_transform_widens_hit_shape() {
        let mut g = group();
        let mover = unit(1, 0.0, 0.0);
        let wall = SimpleCollider::new(2, RectF::new(6.0, -5.0, 1.0, 10.0)).shared();
        let id = g.register(&mover, moving(Angle::RIGHT, 10.0)).unwrap();
        g.register(&wall, MotionOptions::default()).unwrap();
        g.velocity_mut(id)
            .unwrap()
            .set_bounds_transform(|b| RectF::new(b.left, b.top, b.width + 2.0, b.height));

        run(&mut g, 20, 100);
        // the widened shape stops two cells earlier
        assert!(mover.borrow().bounds().right() <= 4.0);
    }

    #[test]
    fn test_malformed_transform_fails_only_that_evaluation() {
        let mut g = group();
        let broken = unit(1, 0.0, 0.0);
        let fine = unit(2, 0.0, 10.0);
        let broken_id = g.register(&broken, moving(Angle::RIGHT, 10.0)).unwrap();
        g.register(&fine, moving(Angle::RIGHT, 10.0)).unwrap();
        g.velocity_mut(broken_id)
            .unwrap()
            .set_bounds_transform(|b| RectF::new(f32::NAN, b.top, b.width, b.height));
        let enforced = Rc::new(RefCell::new(0));
        let counter = enforced.clone();
        g.velocity_mut(broken_id)
            .unwrap()
            .velocity_enforced
            .subscribe(move |p| {
                assert!(!p.is_hit());
                *counter.borrow_mut() += 1;
            });

        let report = g.tick(Duration::from_millis(100));
        assert_eq!(report.failed, 1);
        assert_eq!(*enforced.borrow(), 1);
        assert_eq!(broken.borrow().bounds().left, 0.0);
        assert!((fine.borrow().bounds().left - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_non_finite_travel_fails_the_evaluation() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, moving(Angle::RIGHT, f32::MAX)).unwrap();
        let enforced = Rc::new(RefCell::new(0));
        let counter = enforced.clone();
        g.velocity_mut(id)
            .unwrap()
            .velocity_enforced
            .subscribe(move |_| *counter.borrow_mut() += 1);

        // travel is finite but the lookahead overflows
        let report = g.tick(Duration::from_secs(1));
        assert_eq!(report.failed, 1);
        assert_eq!(report.moved, 0);

        // now the travel itself overflows
        g.set_speed_ratio(2.0).unwrap();
        let report = g.tick(Duration::from_secs(1));
        assert_eq!(report.failed, 1);
        assert_eq!(report.moved, 0);

        assert_eq!(*enforced.borrow(), 2);
        assert_eq!(a.borrow().bounds(), RectF::new(0.0, 0.0, 1.0, 1.0));
        assert!(g.contains(id));
    }

    #[test]
    fn test_very_fast_mover_stops_at_wall() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let wall = SimpleCollider::new(2, RectF::new(5.0, -5.0, 1.0, 10.0)).shared();
        let id = g.register(&a, moving(Angle::RIGHT, 2.0e7)).unwrap();
        g.register(&wall, MotionOptions::default()).unwrap();

        let report = g.tick(Duration::from_secs(1));

        assert_eq!(report.failed, 0);
        assert_eq!(report.impacts, 1);
        assert_eq!(g.velocity(id).unwrap().speed(), 0.0);
        let right = a.borrow().bounds().right();
        assert!(right <= 5.0 && right > 4.0, "right was {right}");
    }

    #[test]
    fn test_bounces_off_flat_strip() {
        // zero height, so the struck left edge is a single point
        let mut g = group();
        let ball = unit(1, 0.0, 0.0);
        let strip = SimpleCollider::new(2, RectF::new(5.0, 0.5, 10.0, 0.0)).shared();
        let id = g
            .register(&ball, MotionOptions {
                angle: Angle::RIGHT,
                speed: 10.0,
                bounce: true,
                ..Default::default()
            })
            .unwrap();
        g.register(&strip, MotionOptions::default()).unwrap();

        let impacts = Rc::new(RefCell::new(0));
        let counter = impacts.clone();
        g.on_impact(move |_| *counter.borrow_mut() += 1);

        run(&mut g, 40, 50);

        assert_eq!(*impacts.borrow(), 1);
        assert_eq!(g.velocity(id).unwrap().angle(), Angle::LEFT);
        assert!(ball.borrow().bounds().left < 0.0);
    }

    #[test]
    fn test_bounces_off_thin_post() {
        // zero width, so the struck top edge is a single point
        let mut g = group();
        let ball = unit(1, 0.0, 0.0);
        let post = SimpleCollider::new(2, RectF::new(0.5, 5.0, 0.0, 10.0)).shared();
        let id = g
            .register(&ball, MotionOptions {
                angle: Angle::DOWN,
                speed: 10.0,
                bounce: true,
                ..Default::default()
            })
            .unwrap();
        g.register(&post, MotionOptions::default()).unwrap();

        let impacts = Rc::new(RefCell::new(0));
        let counter = impacts.clone();
        g.on_impact(move |_| *counter.borrow_mut() += 1);

        run(&mut g, 40, 50);

        assert_eq!(*impacts.borrow(), 1);
        assert_eq!(g.velocity(id).unwrap().angle(), Angle::UP);
        assert!(ball.borrow().bounds().bottom() <= 5.0);
    }

    #[test]
    fn test_dropped_collider_is_pruned() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, moving(Angle::RIGHT, 1.0)).unwrap();
        drop(a);
        let report = g.tick(Duration::from_millis(10));
        assert_eq!(report.removed, 1);
        assert!(!g.contains(id));
        assert_eq!(g.state(), GroupState::Idle);
    }

    #[test]
    fn test_registration_lifetime_deregisters() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let scope = Lifetime::new();
        let id = g
            .register(&a, MotionOptions {
                lifetime: Some(scope.clone()),
                ..Default::default()
            })
            .unwrap();
        g.tick(Duration::from_millis(10));
        assert!(g.contains(id));
        scope.end();
        g.tick(Duration::from_millis(10));
        assert!(!g.contains(id));
    }

    #[test]
    fn test_group_lifetime_disposes() {
        let scope = Lifetime::new();
        let mut g = ColliderGroup::new(EngineSettings::default(), PauseSignal::new(), scope.clone()).unwrap();
        let a = unit(1, 0.0, 0.0);
        g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        scope.end();
        let report = g.tick(Duration::from_millis(100));
        assert_eq!(report, TickReport::default());
        assert_eq!(g.state(), GroupState::Disposed);
        assert_eq!(a.borrow().bounds().left, 0.0);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let pause = PauseSignal::new();
        let mut g = ColliderGroup::new(EngineSettings::default(), pause.clone(), Lifetime::new()).unwrap();
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        run(&mut g, 3, 100);

        pause.pause();
        let frozen_bounds = a.borrow().bounds();
        let frozen_eval = g.velocity(id).unwrap().last_evaluated();
        let frozen_now = g.now();
        for _ in 0..10 {
            assert!(g.tick(Duration::from_millis(100)).paused);
        }
        assert_eq!(a.borrow().bounds(), frozen_bounds);
        assert_eq!(g.velocity(id).unwrap().last_evaluated(), frozen_eval);
        assert_eq!(g.now(), frozen_now);

        pause.resume();
        g.tick(Duration::from_millis(100));
        assert!((a.borrow().bounds().left - frozen_bounds.left - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_global_speed_ratio() {
        let mut g = group();
        g.set_speed_ratio(0.5).unwrap();
        assert!(g.set_speed_ratio(f32::NAN).is_err());
        let a = unit(1, 0.0, 0.0);
        g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        run(&mut g, 10, 100);
        assert!((a.borrow().bounds().left - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_events_fire_every_evaluation() {
        let mut g = group();
        let a = unit(1, 0.0, 0.0);
        let id = g.register(&a, moving(Angle::RIGHT, 10.0)).unwrap();
        let counts = Rc::new(RefCell::new((0, 0)));
        let c = counts.clone();
        g.velocity_mut(id)
            .unwrap()
            .before_move
            .subscribe(move |_| c.borrow_mut().0 += 1);
        let c = counts.clone();
        g.velocity_mut(id)
            .unwrap()
            .velocity_enforced
            .subscribe(move |p| {
                assert!(!p.is_hit());
                c.borrow_mut().1 += 1;
            });
        run(&mut g, 5, 100);
        assert_eq!(*counts.borrow(), (5, 5));
    }
}
