//! Outbound controller events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, forward to a
//! monitoring agent, etc.

use crate::error::{DriverError, Error};
use crate::zones::ZoneId;

/// Why a zone session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An explicit `Reset` instruction.
    Reset,
    /// A `RunZone` for another (or the same) zone took over.
    Preempted,
    /// The requested duration elapsed.
    Expired,
    /// The hard runtime cap was reached before the scheduled end.
    RuntimeCap,
}

/// Structured events emitted by the controller.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// The controller has started (carries zone count).
    Started { zones: usize },

    /// A zone was opened.
    ZoneStarted { zone: ZoneId, duration_mins: u32 },

    /// The running zone was closed.
    ZoneStopped { zone: ZoneId, reason: StopReason },

    /// Every zone output was confirmed off.
    BoardReset,

    /// A driver failure left every zone pin unknown.
    BoardUntrusted(DriverError),

    /// The keep-alive heartbeat was switched on or off.
    RelayBoardEnabled(bool),

    /// An instruction was rejected before touching hardware.
    RequestRejected(Error),
}
