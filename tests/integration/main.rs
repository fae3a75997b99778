//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against simulated pins and a manual clock.  All tests run on the host
//! with no real GPIO required.

mod controller_tests;
mod gateway_tests;
