//! Sprinkler relay controller library.
//!
//! Exposes the controller core, pin backends and request plumbing for the
//! `sprinklerd` binary and for integration testing.  The `cdev` backend is
//! compiled only with the `linux-gpio` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod board;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod rpc;
pub mod safety;
pub mod zones;

// Registers the std time driver that `async_io_mini::Timer` runs on.
use embassy_time as _;
