//! System configuration parameters
//!
//! All tunable parameters for the relay controller.
//! Values can be overridden from a JSON file (see
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile)).

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;
use crate::zones::{MAX_ZONES, PinHandle, ZoneMap, ZonePin};

/// Which GPIO backend drives the relay lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Shell out to libgpiod's `gpioset` for every write.
    Gpioset,
    /// Hold the lines open through the Linux GPIO character device.
    Cdev,
    /// In-memory pins; nothing is switched.
    Simulated,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Board ---
    /// Zone → GPIO line table, in status report order
    pub zones: Vec<ZonePin, MAX_ZONES>,
    /// Keep-alive output watched by the failsafe board
    pub watchdog_line: PinHandle,
    /// GPIO chip name (or `/dev` path) the lines belong to
    pub gpio_chip: String,
    /// GPIO backend
    pub backend: Backend,
    /// Relays energise when the line is driven LOW
    pub active_low: bool,

    // --- Safety ---
    /// Hard cap on how long any zone may stay open (minutes)
    pub max_zone_runtime_mins: u32,
    /// Force every zone off before the first tick
    pub reset_on_start: bool,

    // --- Timing ---
    /// Command processor tick period (milliseconds)
    pub tick_interval_ms: u32,
    /// How long a gateway caller waits for a response (milliseconds)
    pub response_timeout_ms: u32,
    /// A `gpioset` invocation still running after this is killed (milliseconds)
    pub gpioset_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut zones = Vec::new();
        for (zone, line) in pins::ZONE_LINES {
            let _ = zones.push(ZonePin {
                zone,
                line: PinHandle::new(line),
            });
        }

        Self {
            // Board
            zones,
            watchdog_line: PinHandle::new(pins::WATCHDOG_LINE),
            gpio_chip: pins::GPIO_CHIP.into(),
            backend: Backend::Gpioset,
            active_low: true,

            // Safety
            max_zone_runtime_mins: 60,
            reset_on_start: true,

            // Timing
            tick_interval_ms: 500,       // 2 Hz, heartbeat period 1 s
            response_timeout_ms: 10_000, // 10 s
            gpioset_timeout_ms: 2_000,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the controller cannot run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zones.is_empty() {
            return Err(ConfigError::ValidationFailed("zones: at least one zone required"));
        }
        for (i, a) in self.zones.iter().enumerate() {
            if a.zone == 0 {
                return Err(ConfigError::ValidationFailed("zones: zone id 0 is reserved"));
            }
            if a.line == self.watchdog_line {
                return Err(ConfigError::ValidationFailed(
                    "zones: line collides with watchdog_line",
                ));
            }
            for b in &self.zones[i + 1..] {
                if a.zone == b.zone {
                    return Err(ConfigError::ValidationFailed("zones: duplicate zone id"));
                }
                if a.line == b.line {
                    return Err(ConfigError::ValidationFailed("zones: line assigned twice"));
                }
            }
        }
        if self.max_zone_runtime_mins == 0 {
            return Err(ConfigError::ValidationFailed("max_zone_runtime_mins must be > 0"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.response_timeout_ms <= self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "response_timeout_ms must exceed tick_interval_ms",
            ));
        }
        if self.gpioset_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("gpioset_timeout_ms must be > 0"));
        }
        if self.gpio_chip.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("gpio_chip must not be empty"));
        }
        Ok(())
    }

    /// Validate and build the zone bijection.
    pub fn zone_map(&self) -> Result<ZoneMap, ConfigError> {
        self.validate()?;
        Ok(ZoneMap::new(self.zones.clone(), self.watchdog_line))
    }

    /// Every line the controller drives, zones first then the watchdog.
    pub fn output_lines(&self) -> impl Iterator<Item = PinHandle> + '_ {
        self.zones
            .iter()
            .map(|z| z.line)
            .chain(core::iter::once(self.watchdog_line))
    }
}
