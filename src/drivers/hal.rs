//! Direct hardware backend over `embedded-hal` output pins.
//!
//! Any pin type implementing [`StatefulOutputPin`] can drive a relay: the
//! Linux character-device lines in [`cdev`](super::cdev), an I/O expander
//! driver, or a test double.  Reads use the output latch
//! (`is_set_high`), so they report what the hardware is actually driving.

use embedded_hal::digital::{Error as _, StatefulOutputPin};

use crate::app::ports::PinDriver;
use crate::board::{Level, PinState};
use crate::error::DriverError;
use crate::zones::PinHandle;

pub struct HalPinDriver<P> {
    pins: Vec<(PinHandle, P)>,
    active_low: bool,
}

impl<P: StatefulOutputPin> HalPinDriver<P> {
    pub fn new(pins: Vec<(PinHandle, P)>, active_low: bool) -> Self {
        Self { pins, active_low }
    }

    fn pin_mut(&mut self, pin: PinHandle) -> Result<&mut P, DriverError> {
        self.pins
            .iter_mut()
            .find(|(h, _)| *h == pin)
            .map(|(_, p)| p)
            .ok_or(DriverError::UnknownPin(pin))
    }

    fn drives_high(&self, level: Level) -> bool {
        (level == Level::On) != self.active_low
    }
}

impl<P: StatefulOutputPin> PinDriver for HalPinDriver<P> {
    fn set_pin(&mut self, pin: PinHandle, level: Level) -> Result<(), DriverError> {
        let high = self.drives_high(level);
        let out = self.pin_mut(pin)?;
        let result = if high { out.set_high() } else { out.set_low() };
        result.map_err(|e| DriverError::Hal { pin, kind: e.kind() })
    }

    fn read_pin(&mut self, pin: PinHandle) -> PinState {
        let active_low = self.active_low;
        let Ok(out) = self.pin_mut(pin) else {
            return PinState::Unknown;
        };
        match out.is_set_high() {
            Ok(high) if high != active_low => PinState::On,
            Ok(_) => PinState::Off,
            Err(_) => PinState::Unknown,
        }
    }
}
