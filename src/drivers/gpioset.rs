//! libgpiod `gpioset` line-setter backend.
//!
//! Every write shells out to
//!
//! ```text
//! gpioset <chip> <line>=<value> [<line>=<value> ...]
//! ```
//!
//! This is the libgpiod v1 command line: `gpioset` sets the lines and
//! exits at once.  libgpiod v2 changed the syntax (`-c <chip>`) and by
//! default keeps running to hold the lines, so point
//! [`GpiosetDriver::with_program`] at a v1 binary or a wrapper that
//! behaves like one.  Each invocation is killed if it outlives
//! [`DEFAULT_COMMAND_TIMEOUT`] (see [`GpiosetDriver::with_timeout`]) so a
//! hung process cannot stall the tick loop.
//!
//! A batch is a single invocation, so a reset touches every zone line in
//! one process.  Values are electrical: with active-low relays logical
//! `On` is written as `0`.
//!
//! `gpioget` would reconfigure an output as an input, so reads report the
//! level of the last successful write instead.  A line that was never
//! written, or whose last write failed, reads `Unknown`.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::ports::PinDriver;
use crate::board::{Level, PinState};
use crate::error::{DriverError, truncated};
use crate::zones::PinHandle;

const GPIOSET: &str = "gpioset";

/// Longest a single invocation may run before it is killed.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

const EXIT_POLL: Duration = Duration::from_millis(5);

pub struct GpiosetDriver {
    program: String,
    chip: String,
    active_low: bool,
    timeout: Duration,
    confirmed: HashMap<PinHandle, Level>,
}

impl GpiosetDriver {
    pub fn new(chip: impl Into<String>, active_low: bool) -> Self {
        Self::with_program(GPIOSET, chip, active_low)
    }

    /// Use a different executable with the same command line (e.g. a wrapper script).
    pub fn with_program(program: impl Into<String>, chip: impl Into<String>, active_low: bool) -> Self {
        Self {
            program: program.into(),
            chip: chip.into(),
            active_low,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            confirmed: HashMap::new(),
        }
    }

    /// Kill invocations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn electrical(&self, level: Level) -> u8 {
        match (level, self.active_low) {
            (Level::On, false) | (Level::Off, true) => 1,
            (Level::On, true) | (Level::Off, false) => 0,
        }
    }

    /// Arguments for one invocation covering `writes`.
    pub fn command_args(&self, writes: &[(PinHandle, Level)]) -> Vec<String> {
        let mut args = Vec::with_capacity(writes.len() + 1);
        args.push(self.chip.clone());
        args.extend(
            writes
                .iter()
                .map(|&(pin, level)| format!("{}={}", pin.line(), self.electrical(level))),
        );
        args
    }

    fn invoke(&self, writes: &[(PinHandle, Level)]) -> Result<(), DriverError> {
        let args = self.command_args(writes);
        debug!("{} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DriverError::Spawn(e.kind()))?;

        let status = self.wait_bounded(&mut child)?;
        if status.success() {
            return Ok(());
        }
        let mut stderr = Vec::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_end(&mut stderr);
        }
        Err(DriverError::CommandFailed {
            code: status.code(),
            stderr: truncated(&stderr),
        })
    }

    /// Wait for `child` to exit, killing it once the deadline passes.
    fn wait_bounded(&self, child: &mut Child) -> Result<std::process::ExitStatus, DriverError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(None) => {
                    warn!("{} still running after {:?}, killing it", self.program, self.timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DriverError::CommandTimedOut {
                        after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DriverError::Spawn(e.kind()));
                }
            }
        }
    }
}

impl PinDriver for GpiosetDriver {
    fn set_pin(&mut self, pin: PinHandle, level: Level) -> Result<(), DriverError> {
        self.set_pins(&[(pin, level)])
    }

    fn read_pin(&mut self, pin: PinHandle) -> PinState {
        self.confirmed
            .get(&pin)
            .map_or(PinState::Unknown, |level| (*level).into())
    }

    fn set_pins(&mut self, writes: &[(PinHandle, Level)]) -> Result<(), DriverError> {
        if writes.is_empty() {
            return Ok(());
        }
        match self.invoke(writes) {
            Ok(()) => {
                for &(pin, level) in writes {
                    self.confirmed.insert(pin, level);
                }
                Ok(())
            }
            Err(e) => {
                // A failed invocation may have applied any subset of the batch.
                for (pin, _) in writes {
                    self.confirmed.remove(pin);
                }
                Err(e)
            }
        }
    }
}
