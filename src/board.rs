//! In-memory record of the relay board.
//!
//! [`BoardState`] is the single struct the command processor reads from
//! and writes to.  It holds what the controller *knows* about each zone
//! output, whether the keep-alive heartbeat is running, and the current
//! zone session.  Only the [`Controller`](crate::app::service::Controller)
//! owns one; nothing else can mutate it.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::zones::{MAX_ZONES, ZoneId};

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// A level the controller can drive an output to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    On,
    Off,
}

impl Level {
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// What the controller knows about an output.
///
/// `Unknown` means the last write or read could not be confirmed.  It is
/// never treated as equivalent to `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PinState {
    On,
    Off,
    #[default]
    Unknown,
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::On => Self::On,
            Level::Off => Self::Off,
        }
    }
}

// ---------------------------------------------------------------------------
// Running session
// ---------------------------------------------------------------------------

/// The single zone currently open under program control.
///
/// Times are seconds on the controller's [`Clock`](crate::app::ports::Clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningSession {
    pub zone: ZoneId,
    /// Always in `1..=max_zone_runtime_mins`.
    pub requested_mins: u32,
    pub started_at: u64,
    /// `started_at + requested_mins * 60`.
    pub ends_at: u64,
}

impl RunningSession {
    pub fn elapsed_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.started_at)
    }
}

// ---------------------------------------------------------------------------
// BoardState
// ---------------------------------------------------------------------------

/// Per-zone pin knowledge, heartbeat flag and the current session.
#[derive(Debug, Clone)]
pub struct BoardState {
    /// Indexed in [`ZoneMap`](crate::zones::ZoneMap) report order.
    zone_pins: Vec<PinState, MAX_ZONES>,
    /// Whether the keep-alive output is being toggled.
    pub watchdog_enabled: bool,
    /// Last confirmed level of the keep-alive output.
    pub watchdog_pin: PinState,
    pub session: Option<RunningSession>,
}

impl BoardState {
    /// Fresh board: every pin unknown, heartbeat enabled, no session.
    pub fn new(zone_count: usize) -> Self {
        let mut zone_pins = Vec::new();
        for _ in 0..zone_count.min(MAX_ZONES) {
            let _ = zone_pins.push(PinState::Unknown);
        }
        Self {
            zone_pins,
            watchdog_enabled: true,
            watchdog_pin: PinState::Unknown,
            session: None,
        }
    }

    pub fn pin(&self, index: usize) -> PinState {
        self.zone_pins.get(index).copied().unwrap_or(PinState::Unknown)
    }

    pub fn set_pin(&mut self, index: usize, state: PinState) {
        if let Some(slot) = self.zone_pins.get_mut(index) {
            *slot = state;
        }
    }

    /// Overwrite the knowledge of every zone pin at once.
    pub fn mark_all(&mut self, state: PinState) {
        self.zone_pins.iter_mut().for_each(|p| *p = state);
    }

    pub fn pins(&self) -> &[PinState] {
        &self.zone_pins
    }

    /// Number of zone pins known to be on.
    pub fn zones_on(&self) -> usize {
        self.zone_pins.iter().filter(|p| **p == PinState::On).count()
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }
}
