//! Shared pause signal
//!
//! Clones share one flag. A collider group holding a paused signal stops
//! advancing its clock, which freezes every velocity and effect at once.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct PauseSignal {
    paused: Rc<Cell<bool>>,
}

impl PauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        if !self.paused.replace(true) {
            log::debug!("simulation paused");
        }
    }

    pub fn resume(&self) {
        if self.paused.replace(false) {
            log::debug!("simulation resumed");
        }
    }

    /// Flip the flag, returning the new state
    pub fn toggle(&self) -> bool {
        let paused = !self.paused.get();
        self.paused.set(paused);
        paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let signal = PauseSignal::new();
        let other = signal.clone();
        assert!(!other.is_paused());
        signal.pause();
        assert!(other.is_paused());
        assert!(!other.toggle());
        assert!(!signal.is_paused());
    }
}
