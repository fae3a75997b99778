//! Port traits: the hexagonal boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (pin backends, clocks, event sinks, config storage)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the core never knows which GPIO backend
//! is active.

use core::fmt;

use crate::board::{Level, PinState};
use crate::config::SystemConfig;
use crate::error::DriverError;
use crate::zones::PinHandle;

// ───────────────────────────────────────────────────────────────
// Pin driver port (driven adapter: domain ↔ relay outputs)
// ───────────────────────────────────────────────────────────────

/// Uniform on/off/unknown contract over every GPIO backend.
///
/// Levels are *logical*: polarity (active-low relays) is the backend's
/// concern.  Implementations never retry.  After a failed write the
/// caller must treat the pin as [`PinState::Unknown`].
pub trait PinDriver {
    /// Drive one output to `level`.
    fn set_pin(&mut self, pin: PinHandle, level: Level) -> Result<(), DriverError>;

    /// Read the logical level of an output.  `Unknown` only if the read
    /// itself could not be performed.
    fn read_pin(&mut self, pin: PinHandle) -> PinState;

    /// Drive several outputs as one operation, stopping at the first failure.
    fn set_pins(&mut self, writes: &[(PinHandle, Level)]) -> Result<(), DriverError> {
        writes
            .iter()
            .try_for_each(|&(pin, level)| self.set_pin(pin, level))
    }
}

impl<T: PinDriver + ?Sized> PinDriver for Box<T> {
    fn set_pin(&mut self, pin: PinHandle, level: Level) -> Result<(), DriverError> {
        (**self).set_pin(pin, level)
    }

    fn read_pin(&mut self, pin: PinHandle) -> PinState {
        (**self).read_pin(pin)
    }

    fn set_pins(&mut self, writes: &[(PinHandle, Level)]) -> Result<(), DriverError> {
        (**self).set_pins(writes)
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic seconds source used for session start/end and expiry.
pub trait Clock {
    fn now_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`BoardEvent`](super::events::BoardEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BoardEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST run [`SystemConfig::validate`] before returning a
/// config.  Invalid values are rejected, never clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config source does not exist.
    NotFound,
    /// The config source is not valid JSON for [`SystemConfig`].
    Corrupted,
    /// A config field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the config source.
    IoError(std::io::ErrorKind),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(kind) => write!(f, "I/O error ({})", kind),
        }
    }
}

impl std::error::Error for ConfigError {}
