//! Motion and collision simulation
//!
//! Everything here runs on the thread that calls [`ColliderGroup::tick`]:
//! - Hosts own colliders; the group only holds weak references
//! - Time comes from the caller (`tick(dt)`), never from a wall clock
//! - Randomness (the roamer effect) is seeded

pub mod collider;
pub mod effects;
pub mod event;
pub mod group;
pub mod hit;
pub mod lifetime;
pub mod pause;
pub mod velocity;

pub use collider::{Collider, ColliderId, SharedCollider, SimpleCollider};
pub use effects::{Effect, EffectStatus, Effects, Floater, Force, Friction, Governor, Roamer, SeekGoal, Seeker};
pub use event::{Event, ListenerId};
pub use group::{ColliderGroup, GroupState, TickReport};
pub use hit::{HitPrediction, HitType, Obstacle, predict_hit};
pub use lifetime::Lifetime;
pub use pause::PauseSignal;
pub use velocity::{BeforeMove, Impact, MotionOptions, Velocity, bounce_angle};
