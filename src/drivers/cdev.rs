//! Linux GPIO character-device lines as `embedded-hal` output pins.
//!
//! Each relay line is requested once as an output and held for the life of
//! the process, so the kernel keeps driving it between writes.  Wrapped in
//! [`HalPinDriver`](super::hal::HalPinDriver) this is the direct hardware
//! backend (`backend = "cdev"`).

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use log::info;

use crate::zones::PinHandle;

const CONSUMER: &str = "sprinkler";

/// Error from the character-device ioctl layer.
#[derive(Debug)]
pub struct CdevError(pub gpio_cdev::Error);

impl embedded_hal::digital::Error for CdevError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One requested output line.
pub struct CdevLine {
    handle: LineHandle,
}

impl ErrorType for CdevLine {
    type Error = CdevError;
}

impl OutputPin for CdevLine {
    fn set_low(&mut self) -> Result<(), CdevError> {
        self.handle.set_value(0).map_err(CdevError)
    }

    fn set_high(&mut self) -> Result<(), CdevError> {
        self.handle.set_value(1).map_err(CdevError)
    }
}

impl StatefulOutputPin for CdevLine {
    fn is_set_high(&mut self) -> Result<bool, CdevError> {
        self.handle.get_value().map(|v| v != 0).map_err(CdevError)
    }

    fn is_set_low(&mut self) -> Result<bool, CdevError> {
        self.is_set_high().map(|high| !high)
    }
}

/// `/dev` path for a chip given by name (`gpiochip0`) or full path.
pub fn chip_path(chip: &str) -> String {
    if chip.starts_with('/') {
        chip.to_owned()
    } else {
        format!("/dev/{chip}")
    }
}

/// Request every line in `lines` as an output, initially driven `idle_high`.
///
/// `idle_high` should be the electrical *off* level so that requesting a
/// line never opens a valve.
pub fn open_lines(
    chip: &str,
    lines: impl IntoIterator<Item = PinHandle>,
    idle_high: bool,
) -> Result<Vec<(PinHandle, CdevLine)>, gpio_cdev::Error> {
    let path = chip_path(chip);
    let mut chip = Chip::new(&path)?;
    let mut out = Vec::new();
    for pin in lines {
        let handle = chip
            .get_line(pin.line())?
            .request(LineRequestFlags::OUTPUT, u8::from(idle_high), CONSUMER)?;
        out.push((pin, CdevLine { handle }));
    }
    info!("cdev: requested {} output lines on {}", out.len(), path);
    Ok(out)
}
