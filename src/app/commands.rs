//! Inbound instructions to the command processor.
//!
//! These represent actions requested by the outside world (console,
//! HTTP gateway) that the [`Controller`](super::service::Controller)
//! interprets and acts upon.  An instruction carries no sender identity;
//! each one is answered by exactly one [`Response`].

use super::status::StatusReport;
use crate::error::Error;

/// Instructions that external adapters can send into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Force every zone off.
    Reset,

    /// Open `zone` for `duration_mins`, closing any other zone first.
    /// Raw integers as received; validated by the processor.
    RunZone { zone: i32, duration_mins: i32 },

    /// Resume toggling the failsafe keep-alive.
    Enable,

    /// Stop toggling the keep-alive; the failsafe board then drops power.
    Disable,

    /// Report board status without changing anything.
    GetStatus,
}

impl Instruction {
    /// Whether the instruction may change board state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::GetStatus)
    }
}

/// The single answer to an [`Instruction`]: a status snapshot, or the
/// failure in its place.
pub type Response = Result<StatusReport, Error>;
