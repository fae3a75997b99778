//! In-memory relay outputs.
//!
//! Used for dry runs (`backend = "simulated"`) and as the host-side test
//! double.  Clones share one board, so a test can keep a handle, hand
//! another to the controller, and inject faults or inspect the write
//! history while the controller runs.  The history keeps only the most
//! recent [`HISTORY_CAPACITY`] writes so a long dry run stays bounded.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::HistoryBuffer;

use crate::app::ports::PinDriver;
use crate::board::{Level, PinState};
use crate::error::DriverError;
use crate::zones::PinHandle;

/// Successful writes retained for inspection.
pub const HISTORY_CAPACITY: usize = 512;

#[derive(Default)]
struct SimBoard {
    levels: HashMap<PinHandle, Level>,
    history: HistoryBuffer<(PinHandle, Level), HISTORY_CAPACITY>,
    total_writes: usize,
    failing: HashSet<PinHandle>,
    fail_all: bool,
    /// Pins whose read-back ignores writes and reports this level.
    stuck: HashMap<PinHandle, Level>,
    unreadable: bool,
}

/// Shared simulated board.
#[derive(Clone, Default)]
pub struct SimulatedPins {
    inner: Arc<Mutex<SimBoard>>,
}

impl SimulatedPins {
    pub fn new() -> Self {
        Self::default()
    }

    fn board(&self) -> MutexGuard<'_, SimBoard> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every subsequent write fails.
    pub fn fail_all_writes(&self) {
        self.board().fail_all = true;
    }

    /// Writes to `pin` fail.
    pub fn fail_pin(&self, pin: PinHandle) {
        self.board().failing.insert(pin);
    }

    /// `pin` accepts writes but reads back `level`.
    pub fn stick_pin(&self, pin: PinHandle, level: Level) {
        self.board().stuck.insert(pin, level);
    }

    /// Reads can no longer be performed.
    pub fn fail_reads(&self) {
        self.board().unreadable = true;
    }

    /// Clear every injected fault.
    pub fn heal(&self) {
        let mut b = self.board();
        b.fail_all = false;
        b.failing.clear();
        b.stuck.clear();
        b.unreadable = false;
    }

    /// Current level of `pin`, if it was ever written.
    pub fn level(&self, pin: PinHandle) -> Option<Level> {
        self.board().levels.get(&pin).copied()
    }

    /// Retained successful writes to `pin`, oldest first.
    pub fn writes_to(&self, pin: PinHandle) -> Vec<Level> {
        self.board()
            .history
            .oldest_ordered()
            .filter(|(p, _)| *p == pin)
            .map(|(_, l)| *l)
            .collect()
    }

    /// Number of successful writes across all pins, including any that
    /// have aged out of the history.
    pub fn write_count(&self) -> usize {
        self.board().total_writes
    }
}

impl PinDriver for SimulatedPins {
    fn set_pin(&mut self, pin: PinHandle, level: Level) -> Result<(), DriverError> {
        let mut b = self.board();
        if b.fail_all || b.failing.contains(&pin) {
            return Err(DriverError::Injected(pin));
        }
        b.levels.insert(pin, level);
        b.history.write((pin, level));
        b.total_writes += 1;
        Ok(())
    }

    fn read_pin(&mut self, pin: PinHandle) -> PinState {
        let b = self.board();
        if b.unreadable {
            return PinState::Unknown;
        }
        if let Some(level) = b.stuck.get(&pin) {
            return (*level).into();
        }
        b.levels.get(&pin).map_or(PinState::Unknown, |l| (*l).into())
    }
}
