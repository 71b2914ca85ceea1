//! Cancellation scope for groups and registrations

use std::cell::Cell;
use std::rc::Rc;

/// A cloneable token; once ended, every clone reports ended
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    ended: Rc<Cell<bool>>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end(&self) {
        self.ended.set(true);
    }

    pub fn is_ended(&self) -> bool {
        self.ended.get()
    }
}
