//! Read-only status snapshot handed back to callers.
//!
//! Serialises to the external shape:
//!
//! ```json
//! { "zoneList": [ { "zone": 3, "state": "ON", "requestedOnMins": 10, "elapsedOnSecs": 42 } ],
//!   "relayBoardEnabled": true }
//! ```

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::board::{BoardState, PinState};
use crate::zones::{MAX_ZONES, ZoneId, ZoneMap};

/// Reported state of one zone output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneState {
    On,
    Off,
    Unknown,
}

impl From<PinState> for ZoneState {
    fn from(state: PinState) -> Self {
        match state {
            PinState::On => Self::On,
            PinState::Off => Self::Off,
            PinState::Unknown => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    pub zone: ZoneId,
    pub state: ZoneState,
    /// Present only for the running zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_on_mins: Option<u32>,
    /// Present only for the running zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_on_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub zone_list: Vec<ZoneStatus, MAX_ZONES>,
    pub relay_board_enabled: bool,
}

impl StatusReport {
    /// Pure read of `board` in zone-map order.  `now` is only used for the
    /// running zone's elapsed time.
    pub fn capture(zones: &ZoneMap, board: &BoardState, now: u64) -> Self {
        let mut zone_list = Vec::new();
        for (idx, entry) in zones.iter().enumerate() {
            let session = board.session.filter(|s| s.zone == entry.zone);
            let _ = zone_list.push(ZoneStatus {
                zone: entry.zone,
                state: board.pin(idx).into(),
                requested_on_mins: session.map(|s| s.requested_mins),
                elapsed_on_secs: session.map(|s| s.elapsed_secs(now)),
            });
        }
        Self {
            zone_list,
            relay_board_enabled: board.watchdog_enabled,
        }
    }

    pub fn zone(&self, zone: ZoneId) -> Option<&ZoneStatus> {
        self.zone_list.iter().find(|z| z.zone == zone)
    }

    /// Zones currently reported `ON`.
    pub fn zones_on(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zone_list
            .iter()
            .filter(|z| z.state == ZoneState::On)
            .map(|z| z.zone)
    }
}
