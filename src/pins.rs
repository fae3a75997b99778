//! GPIO line assignments for the reference relay board.
//!
//! Single source of truth for the default zone table.  A deployment can
//! override every entry through the JSON config file; these values are
//! what [`SystemConfig::default`](crate::config::SystemConfig) uses.
//!
//! Line numbers are offsets on the board's GPIO chip (`gpiochip0`).

// ---------------------------------------------------------------------------
// Zone relays (active-low: line LOW = valve open)
// ---------------------------------------------------------------------------

/// `(zone, line)` pairs for the 16-channel relay board, in report order.
pub const ZONE_LINES: [(u8, u32); 16] = [
    (1, 1),
    (2, 2),
    (3, 3),
    (4, 0),
    (5, 198),
    (6, 203),
    (7, 205),
    (8, 13),
    (9, 15),
    (10, 6),
    (11, 204),
    (12, 21),
    (13, 16),
    (14, 20),
    (15, 202),
    (16, 199),
];

// ---------------------------------------------------------------------------
// Failsafe board
// ---------------------------------------------------------------------------

/// Keep-alive output monitored by the failsafe board.  If it stops
/// toggling, the failsafe board de-energises every relay.
pub const WATCHDOG_LINE: u32 = 201;

/// GPIO chip the relay lines live on.
pub const GPIO_CHIP: &str = "gpiochip0";
