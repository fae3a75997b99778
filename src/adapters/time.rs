//! Time adapters.
//!
//! - [`MonotonicClock`]: seconds since the process started, from
//!   `std::time::Instant`.  Immune to wall-clock steps (NTP, RTC resets),
//!   so a session can never be extended or cut short by a clock change.
//! - [`ManualClock`]: a clock that only moves when told to, for
//!   simulations and tests.  Clones share the same time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::app::ports::Clock;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    /// Seconds since construction (monotonic).
    fn now_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

#[derive(Clone, Default)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start_secs)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}
