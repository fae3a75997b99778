//! Hardware adapter: selects the pin backend named by configuration.
//!
//! The controller is generic over [`PinDriver`]; this is the only place
//! that knows which concrete backend is in use.  Everything downstream
//! sees a boxed driver.

use std::time::Duration;

use log::info;

use crate::app::ports::{ConfigError, PinDriver};
use crate::config::{Backend, SystemConfig};
use crate::drivers::gpioset::GpiosetDriver;
use crate::drivers::sim::SimulatedPins;

/// Backend-erased driver handed to the processor thread.
pub type BoxedDriver = Box<dyn PinDriver + Send>;

/// Build the driver for `config.backend`.
pub fn build_driver(config: &SystemConfig) -> Result<BoxedDriver, ConfigError> {
    match config.backend {
        Backend::Gpioset => {
            info!("Pin backend: gpioset on {}", config.gpio_chip);
            let timeout = Duration::from_millis(config.gpioset_timeout_ms.into());
            Ok(Box::new(
                GpiosetDriver::new(config.gpio_chip.clone(), config.active_low).with_timeout(timeout),
            ))
        }
        Backend::Simulated => {
            info!("Pin backend: simulated (no relays will switch)");
            Ok(Box::new(SimulatedPins::new()))
        }
        Backend::Cdev => open_cdev(config),
    }
}

#[cfg(feature = "linux-gpio")]
fn open_cdev(config: &SystemConfig) -> Result<BoxedDriver, ConfigError> {
    use crate::drivers::cdev;
    use crate::drivers::hal::HalPinDriver;

    // Request lines at the electrical off level.
    let lines = cdev::open_lines(&config.gpio_chip, config.output_lines(), config.active_low).map_err(|e| {
        log::error!("cdev: {}", e);
        ConfigError::IoError(std::io::ErrorKind::Other)
    })?;
    info!("Pin backend: cdev on {}", config.gpio_chip);
    Ok(Box::new(HalPinDriver::new(lines, config.active_low)))
}

#[cfg(not(feature = "linux-gpio"))]
fn open_cdev(_config: &SystemConfig) -> Result<BoxedDriver, ConfigError> {
    Err(ConfigError::ValidationFailed(
        "backend \"cdev\" requires the linux-gpio feature",
    ))
}
