//! The collider contract hosts implement
//!
//! The engine never owns a collider. Hosts keep them behind
//! `Rc<RefCell<..>>` and the collider group only holds weak references.
//! All access happens on the thread that drives the group; sharing a
//! collider with another thread is not supported.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::RectF;

/// A collider shared between its host and the engine
pub type SharedCollider = Rc<RefCell<dyn Collider>>;

/// Dense handle assigned by a collider group at registration.
///
/// The generation changes whenever a slot is reused, so a stale id never
/// resolves to a newer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId {
    index: u32,
    generation: u32,
}

impl ColliderId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ColliderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Anything with rectangular bounds that can move and be struck
pub trait Collider {
    /// Current bounds, used for hit testing
    fn bounds(&self) -> RectF;

    /// Called by the engine when it moves the collider
    fn set_bounds(&mut self, bounds: RectF);

    /// Full extent of a compound entity; used for broad-phase filtering
    fn mass_bounds(&self) -> RectF {
        self.bounds()
    }

    /// Stable identity, unique among registered colliders
    fn identity(&self) -> u64;

    /// Layer bits this collider occupies
    fn layer(&self) -> u32 {
        1
    }

    /// Layer bits this collider is willing to hit
    fn mask(&self) -> u32 {
        u32::MAX
    }

    /// Whether this pair may collide. Must be symmetric.
    fn can_collide_with(&self, other: &dyn Collider) -> bool {
        self.mask() & other.layer() != 0 && other.mask() & self.layer() != 0
    }
}

/// A plain rectangle collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleCollider {
    pub identity: u64,
    pub bounds: RectF,
    pub layer: u32,
    pub mask: u32,
}

impl SimpleCollider {
    pub fn new(identity: u64, bounds: RectF) -> Self {
        Self {
            identity,
            bounds,
            layer: 1,
            mask: u32::MAX,
        }
    }

    pub fn with_layers(mut self, layer: u32, mask: u32) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Wrap for registration with a collider group
    pub fn shared(self) -> SharedCollider {
        Rc::new(RefCell::new(self))
    }
}

impl Collider for SimpleCollider {
    fn bounds(&self) -> RectF {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: RectF) {
        self.bounds = bounds;
    }

    fn identity(&self) -> u64 {
        self.identity
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn mask(&self) -> u32 {
        self.mask
    }
}
