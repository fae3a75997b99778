//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured board events to the
//! `log` facade (rendered by whatever subscriber the binary installs).

use log::{error, info, warn};

use crate::app::events::BoardEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BoardEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::Started { zones } => {
                info!("START | zones={}", zones);
            }
            BoardEvent::ZoneStarted {
                zone,
                duration_mins,
            } => {
                info!("ZONE  | {} on | requested={}min", zone, duration_mins);
            }
            BoardEvent::ZoneStopped { zone, reason } => {
                info!("ZONE  | {} off | reason={:?}", zone, reason);
            }
            BoardEvent::BoardReset => {
                info!("BOARD | all zones confirmed off");
            }
            BoardEvent::BoardUntrusted(e) => {
                error!("BOARD | zone states unknown | {}", e);
            }
            BoardEvent::RelayBoardEnabled(enabled) => {
                if *enabled {
                    info!("RELAY | keep-alive enabled");
                } else {
                    warn!("RELAY | keep-alive disabled, failsafe board will drop power");
                }
            }
            BoardEvent::RequestRejected(e) => {
                warn!("REQ   | rejected | {}", e);
            }
        }
    }
}
