//! Zone identifiers and the static zone → output mapping.

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Maximum number of zones a single board can carry.
pub const MAX_ZONES: usize = 32;

/// Irrigation zone identifier as configured (1-based in the reference board).
pub type ZoneId = u8;

/// Opaque reference to one physical output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinHandle(u32);

impl PinHandle {
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    /// Line offset on the GPIO chip.
    pub const fn line(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PinHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// One row of the zone table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePin {
    pub zone: ZoneId,
    pub line: PinHandle,
}

/// Bijection between zones and their relay outputs, in report order.
///
/// Built once from a validated [`SystemConfig`](crate::config::SystemConfig)
/// and never modified afterwards.
#[derive(Debug, Clone)]
pub struct ZoneMap {
    entries: Vec<ZonePin, MAX_ZONES>,
    watchdog: PinHandle,
}

impl ZoneMap {
    /// Caller guarantees `entries` is a bijection that excludes `watchdog`
    /// (see [`SystemConfig::validate`](crate::config::SystemConfig::validate)).
    pub(crate) fn new(entries: Vec<ZonePin, MAX_ZONES>, watchdog: PinHandle) -> Self {
        Self { entries, watchdog }
    }

    /// Position of `zone` in report order.
    pub fn index_of(&self, zone: ZoneId) -> Option<usize> {
        self.entries.iter().position(|e| e.zone == zone)
    }

    pub fn pin_for(&self, zone: ZoneId) -> Option<PinHandle> {
        self.entries.iter().find(|e| e.zone == zone).map(|e| e.line)
    }

    pub fn zone_for(&self, pin: PinHandle) -> Option<ZoneId> {
        self.entries.iter().find(|e| e.line == pin).map(|e| e.zone)
    }

    pub fn watchdog(&self) -> PinHandle {
        self.watchdog
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZonePin> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
