//! GPIO backends for the relay outputs and the failsafe heartbeat.
//!
//! | Backend   | Module      | Switches relays via           |
//! |-----------|-------------|-------------------------------|
//! | gpioset   | `gpioset`   | libgpiod `gpioset` process    |
//! | cdev      | `hal`+`cdev`| `embedded-hal` pins on /dev   |
//! | simulated | `sim`       | nothing (in-memory)           |

#[cfg(feature = "linux-gpio")]
pub mod cdev;
pub mod gpioset;
pub mod hal;
pub mod sim;
pub mod watchdog;
