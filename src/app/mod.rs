//! Application core: the command processor's domain logic, zero I/O.
//!
//! This module contains the rules for the relay board: the single-zone
//! interlock, the runtime cap, and status reporting.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real relays.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
