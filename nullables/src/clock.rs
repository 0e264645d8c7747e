//! Settable clock for driving deadlines in tests.
//!
//! Engines never read time themselves; every call takes `now`. Scenarios
//! hold one `NullClock` and pass `clock.now()` so phases line up.

use bond_types::Timestamp;
use std::cell::Cell;

#[derive(Debug, Default)]
pub struct NullClock {
    secs: Cell<u64>,
}

impl NullClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Cell::new(start_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.get())
    }

    /// Move forward by `secs`, saturating at the end of time.
    pub fn advance(&self, secs: u64) {
        self.secs.set(self.now().plus(secs).as_secs());
    }

    pub fn set(&self, secs: u64) {
        self.secs.set(secs);
    }

    /// Jump to the first second strictly after `deadline`.
    pub fn pass(&self, deadline: Timestamp) {
        self.set(deadline.plus(1).as_secs());
    }
}
