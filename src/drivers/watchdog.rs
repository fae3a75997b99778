//! Failsafe keep-alive heartbeat.
//!
//! The external failsafe board keeps the relay supply energised only while
//! the keep-alive line keeps changing.  Flipping the line once per tick
//! produces a square wave with a period of two ticks.  When the heartbeat
//! stops (heartbeat disabled, process hung or dead) the failsafe board
//! times out and de-energises every relay regardless of software state.

use log::{debug, warn};

use crate::app::ports::PinDriver;
use crate::board::{Level, PinState};
use crate::error::DriverError;
use crate::zones::PinHandle;

pub struct Heartbeat {
    pin: PinHandle,
    level: Level,
}

impl Heartbeat {
    pub fn new(pin: PinHandle) -> Self {
        Self {
            pin,
            level: Level::Off,
        }
    }

    /// Level most recently requested.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Flip the keep-alive line.  Returns the confirmed pin state; a failed
    /// write reports `Unknown` and the next beat tries the opposite level.
    pub fn beat(&mut self, driver: &mut impl PinDriver) -> Result<PinState, DriverError> {
        self.level = self.level.toggled();
        debug!("keep-alive {:?}", self.level);
        match driver.set_pin(self.pin, self.level) {
            Ok(()) => Ok(self.level.into()),
            Err(e) => {
                warn!("keep-alive write failed: {}", e);
                Err(e)
            }
        }
    }
}
