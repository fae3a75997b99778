//! Unified error types for the controller.
//!
//! A single [`Error`] enum crosses the mailbox boundary as the failure half
//! of a [`Response`](crate::app::commands::Response), so every variant is
//! `Clone + Send` and carries its diagnostic detail inline.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::board::{Level, PinState};
use crate::zones::PinHandle;

/// Capacity of captured line-setter stderr.
pub const STDERR_CAPACITY: usize = 128;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Error {
    /// Unknown zone, or a duration outside `1..=max_zone_runtime_mins`.
    /// Rejected before any hardware was touched.
    InvalidParameters { zone: i32, duration_mins: i32 },
    /// A pin write or read did not succeed.  Every zone pin is now unknown.
    Driver(DriverError),
    /// No response arrived within the gateway's bounded wait.  The
    /// instruction may still run, or may already have run.
    ResponseTimeout,
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
}

impl Error {
    /// Stable machine-readable name for API surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameters { .. } => "InvalidParameters",
            Self::Driver(_) => "DriverFailure",
            Self::ResponseTimeout => "ResponseTimeout",
            Self::Config(_) => "Config",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters {
                zone,
                duration_mins,
            } => write!(f, "invalid zone/duration params: {zone} {duration_mins}"),
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::ResponseTimeout => write!(f, "timed out waiting for the command processor"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum DriverError {
    /// The line-setter process could not be started.
    Spawn(std::io::ErrorKind),
    /// The line-setter did not exit within its deadline and was killed.
    CommandTimedOut { after_ms: u64 },
    /// The line-setter ran but exited unsuccessfully.
    CommandFailed {
        code: Option<i32>,
        stderr: heapless::String<STDERR_CAPACITY>,
    },
    /// The HAL rejected an operation on `pin`.
    Hal {
        pin: PinHandle,
        kind: embedded_hal::digital::ErrorKind,
    },
    /// No output is registered for `pin` in this backend.
    UnknownPin(PinHandle),
    /// Read-back after a write disagreed with the requested level.
    Readback {
        pin: PinHandle,
        expected: Level,
        actual: PinState,
    },
    /// Failure injected into the simulated backend.
    Injected(PinHandle),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(kind) => write!(f, "gpioset could not be started ({kind})"),
            Self::CommandTimedOut { after_ms } => write!(f, "gpioset killed after {after_ms} ms"),
            Self::CommandFailed { code, stderr } => match code {
                Some(code) => write!(f, "gpioset error! exit {code}: {stderr}"),
                None => write!(f, "gpioset error! terminated by signal: {stderr}"),
            },
            Self::Hal { pin, kind } => write!(f, "{pin}: {kind:?}"),
            Self::UnknownPin(pin) => write!(f, "{pin} is not an output of this board"),
            Self::Readback {
                pin,
                expected,
                actual,
            } => write!(f, "{pin}: wrote {expected:?}, read back {actual:?}"),
            Self::Injected(pin) => write!(f, "{pin}: injected failure"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Copy as much of `bytes` (lossy UTF-8) as fits into a fixed-capacity string.
pub(crate) fn truncated<const N: usize>(bytes: &[u8]) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in String::from_utf8_lossy(bytes).trim_end().chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
