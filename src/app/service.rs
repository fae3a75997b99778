//! Command processor: the hexagonal core.
//!
//! [`Controller`] owns the board state, the runtime supervisor and the
//! heartbeat.  It is the only code that ever writes a relay line.  Each
//! call to [`Controller::tick`] is one processor tick:
//!
//! ```text
//!  1. handle at most one instruction   ──▶ Response
//!  2. flip the keep-alive (if enabled)
//!  3. close the running zone if it has expired
//! ```
//!
//! Pin knowledge is conservative: whenever a write or read-back fails,
//! every zone pin becomes `Unknown` until a later reset confirms them off.
//! Only the first failure of such a stretch is logged as an error and
//! announced as [`BoardEvent::BoardUntrusted`]; retries while the board is
//! still untrusted log at debug level.

use log::{debug, error, info, warn};

use crate::board::{BoardState, Level, PinState};
use crate::config::SystemConfig;
use crate::drivers::watchdog::Heartbeat;
use crate::error::{DriverError, Error, Result};
use crate::safety::RuntimeSupervisor;
use crate::zones::{MAX_ZONES, PinHandle, ZoneMap};

use super::commands::{Instruction, Response};
use super::events::{BoardEvent, StopReason};
use super::ports::{Clock, EventSink, PinDriver};
use super::status::StatusReport;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<D, C> {
    zones: ZoneMap,
    board: BoardState,
    supervisor: RuntimeSupervisor,
    heartbeat: Heartbeat,
    driver: D,
    clock: C,
    tick_count: u64,
    /// Set by a driver failure, cleared by the next confirmed reset.
    untrusted: bool,
}

impl<D: PinDriver, C: Clock> Controller<D, C> {
    /// Construct the controller from configuration.
    ///
    /// Every zone pin starts `Unknown` and the heartbeat enabled.  Nothing
    /// is written until [`start`](Self::start) or the first tick.
    pub fn new(config: &SystemConfig, driver: D, clock: C) -> Result<Self> {
        let zones = config.zone_map()?;
        Ok(Self {
            board: BoardState::new(zones.len()),
            heartbeat: Heartbeat::new(zones.watchdog()),
            supervisor: RuntimeSupervisor::new(config.max_zone_runtime_mins),
            zones,
            driver,
            clock,
            tick_count: 0,
            untrusted: false,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the controller and optionally force every zone off.
    pub fn start(&mut self, reset: bool, sink: &mut impl EventSink) -> Result<()> {
        sink.emit(&BoardEvent::Started {
            zones: self.zones.len(),
        });
        info!("Controller started with {} zones", self.zones.len());
        if reset {
            self.reset_board(StopReason::Reset, sink)?;
        }
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one processor tick.  Returns the response to `instruction`, if
    /// one was given.
    pub fn tick(&mut self, instruction: Option<Instruction>, sink: &mut impl EventSink) -> Option<Response> {
        self.tick_count += 1;

        // 1. At most one instruction per tick
        let response = instruction.map(|i| self.handle_instruction(i, sink));

        // 2. Keep-alive for the failsafe board
        if self.board.watchdog_enabled {
            self.board.watchdog_pin = match self.heartbeat.beat(&mut self.driver) {
                Ok(state) => state,
                Err(_) => PinState::Unknown,
            };
        }

        // 3. Expiry
        self.check_expiry(sink);

        response
    }

    // ── Instruction handling ──────────────────────────────────

    /// Apply one instruction and build its response.
    pub fn handle_instruction(&mut self, instruction: Instruction, sink: &mut impl EventSink) -> Response {
        if instruction.is_mutation() {
            info!("Processing instruction {:?}", instruction);
        } else {
            debug!("Processing instruction {:?}", instruction);
        }
        let outcome = match instruction {
            Instruction::Reset => self.reset_board(StopReason::Reset, sink),
            Instruction::RunZone { zone, duration_mins } => self.run_zone(zone, duration_mins, sink),
            Instruction::Enable => {
                self.set_enabled(true, sink);
                Ok(())
            }
            Instruction::Disable => {
                self.set_enabled(false, sink);
                Ok(())
            }
            Instruction::GetStatus => Ok(()),
        };
        outcome.map(|()| self.status())
    }

    fn set_enabled(&mut self, enabled: bool, sink: &mut impl EventSink) {
        if self.board.watchdog_enabled != enabled {
            sink.emit(&BoardEvent::RelayBoardEnabled(enabled));
        }
        self.board.watchdog_enabled = enabled;
    }

    /// Switch every zone off and confirm it.  On success the board is
    /// idle; on failure every zone pin is unknown and any session stays
    /// recorded so expiry keeps trying to close it.
    fn reset_board(&mut self, reason: StopReason, sink: &mut impl EventSink) -> Result<()> {
        let mut writes: heapless::Vec<(PinHandle, Level), MAX_ZONES> = heapless::Vec::new();
        for entry in self.zones.iter() {
            let _ = writes.push((entry.line, Level::Off));
        }

        let result = self
            .driver
            .set_pins(&writes)
            .and_then(|()| self.verify(&writes));

        match result {
            Ok(()) => {
                self.board.mark_all(PinState::Off);
                if self.untrusted {
                    info!("all zones confirmed off, board trusted again");
                    self.untrusted = false;
                }
                if let Some(session) = self.board.session.take() {
                    info!("zone {} stopped ({:?})", session.zone, reason);
                    sink.emit(&BoardEvent::ZoneStopped {
                        zone: session.zone,
                        reason,
                    });
                }
                sink.emit(&BoardEvent::BoardReset);
                Ok(())
            }
            Err(e) => Err(self.untrust(e, sink)),
        }
    }

    fn run_zone(&mut self, zone: i32, duration_mins: i32, sink: &mut impl EventSink) -> Result<()> {
        let request = match self.supervisor.validate(&self.zones, zone, duration_mins) {
            Ok(r) => r,
            Err(e) => {
                warn!("Rejected RunZone: {}", e);
                sink.emit(&BoardEvent::RequestRejected(e.clone()));
                return Err(e);
            }
        };

        self.reset_board(StopReason::Preempted, sink)?;

        let write = [(request.pin, Level::On)];
        let result = self
            .driver
            .set_pins(&write)
            .and_then(|()| self.verify(&write));

        match result {
            Ok(()) => {
                self.board.set_pin(request.index, PinState::On);
                self.board.session = Some(self.supervisor.open_session(&request, self.clock.now_secs()));
                info!("zone {} on for {} min", request.zone, request.duration_mins);
                sink.emit(&BoardEvent::ZoneStarted {
                    zone: request.zone,
                    duration_mins: request.duration_mins,
                });
                Ok(())
            }
            Err(e) => Err(self.untrust(e, sink)),
        }
    }

    /// Read back every written line.
    fn verify(&mut self, writes: &[(PinHandle, Level)]) -> core::result::Result<(), DriverError> {
        for &(pin, expected) in writes {
            let actual = self.driver.read_pin(pin);
            if actual != PinState::from(expected) {
                return Err(DriverError::Readback {
                    pin,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Widen every zone pin to `Unknown` after a driver failure.
    fn untrust(&mut self, e: DriverError, sink: &mut impl EventSink) -> Error {
        self.board.mark_all(PinState::Unknown);
        if self.untrusted {
            debug!("Driver still failing: {}", e);
        } else {
            error!("Driver failure, all zone states now unknown: {}", e);
            self.untrusted = true;
            sink.emit(&BoardEvent::BoardUntrusted(e.clone()));
        }
        Error::Driver(e)
    }

    fn check_expiry(&mut self, sink: &mut impl EventSink) {
        let Some(session) = self.board.session else {
            return;
        };
        let Some(reason) = self.supervisor.expiry(&session, self.clock.now_secs()) else {
            return;
        };
        let retrying = self.untrusted;
        if let Err(e) = self.reset_board(reason, sink) {
            if retrying {
                debug!("zone {} still open past expiry: {}", session.zone, e);
            } else {
                error!("zone {} could not be closed on expiry: {}", session.zone, e);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the board for callers.
    pub fn status(&self) -> StatusReport {
        StatusReport::capture(&self.zones, &self.board, self.clock.now_secs())
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    /// True from a driver failure until a reset confirms every zone off.
    pub fn is_untrusted(&self) -> bool {
        self.untrusted
    }

    /// Total ticks executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn max_runtime_mins(&self) -> u32 {
        self.supervisor.max_runtime_mins()
    }
}
