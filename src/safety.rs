//! Runtime supervisor.
//!
//! Guards the two numeric invariants of a zone session:
//!
//! 1. A request is only accepted for a configured zone with a duration in
//!    `1..=max_zone_runtime_mins`.  Anything else is rejected before the
//!    controller touches a pin.
//! 2. A running session ends when `now >= ends_at` **or** when
//!    `now >= started_at + max_zone_runtime_mins * 60`.  The second clause
//!    is checked independently of the first so a miscomputed `ends_at`
//!    still cannot keep a valve open past the hard cap.

use log::warn;

use crate::app::events::StopReason;
use crate::board::RunningSession;
use crate::error::{Error, Result};
use crate::zones::{PinHandle, ZoneId, ZoneMap};

/// A validated `RunZone` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRequest {
    pub zone: ZoneId,
    pub index: usize,
    pub pin: PinHandle,
    pub duration_mins: u32,
}

/// Runtime supervisor.
pub struct RuntimeSupervisor {
    max_runtime_mins: u32,
}

impl RuntimeSupervisor {
    pub fn new(max_runtime_mins: u32) -> Self {
        Self { max_runtime_mins }
    }

    pub fn max_runtime_mins(&self) -> u32 {
        self.max_runtime_mins
    }

    fn max_runtime_secs(&self) -> u64 {
        u64::from(self.max_runtime_mins) * 60
    }

    /// Check a raw `RunZone` request against the zone map and runtime cap.
    pub fn validate(&self, zones: &ZoneMap, zone: i32, duration_mins: i32) -> Result<ZoneRequest> {
        let rejected = Error::InvalidParameters { zone, duration_mins };

        let Ok(zone_id) = ZoneId::try_from(zone) else {
            return Err(rejected);
        };
        let (Some(index), Some(pin)) = (zones.index_of(zone_id), zones.pin_for(zone_id)) else {
            return Err(rejected);
        };
        let duration = match u32::try_from(duration_mins) {
            Ok(d) if d > 0 && d <= self.max_runtime_mins => d,
            _ => return Err(rejected),
        };

        Ok(ZoneRequest {
            zone: zone_id,
            index,
            pin,
            duration_mins: duration,
        })
    }

    /// Session for a request that has just been switched on at `now`.
    ///
    /// The duration is clamped to the cap again so the stored end time can
    /// never exceed it even if a caller skipped [`validate`](Self::validate).
    pub fn open_session(&self, request: &ZoneRequest, now: u64) -> RunningSession {
        let mins = request.duration_mins.min(self.max_runtime_mins);
        RunningSession {
            zone: request.zone,
            requested_mins: request.duration_mins,
            started_at: now,
            ends_at: now + u64::from(mins) * 60,
        }
    }

    /// Whether `session` must be closed at `now`, and why.
    pub fn expiry(&self, session: &RunningSession, now: u64) -> Option<StopReason> {
        if now >= session.ends_at {
            return Some(StopReason::Expired);
        }
        if now >= session.started_at.saturating_add(self.max_runtime_secs()) {
            warn!(
                "zone {} hit the {} min runtime cap before its scheduled end",
                session.zone, self.max_runtime_mins
            );
            return Some(StopReason::RuntimeCap);
        }
        None
    }
}
