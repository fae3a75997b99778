//! Controller behaviour through whole ticks.
//!
//! Covers the interlock, parameter rejection, expiry on a simulated
//! clock, pin-fault handling and the keep-alive heartbeat.

use sprinkler::app::commands::Instruction;
use sprinkler::app::events::{BoardEvent, StopReason};
use sprinkler::app::status::ZoneState;
use sprinkler::board::{Level, PinState};
use sprinkler::error::{DriverError, Error};

use super::mock_hw::{Rig, all_zones};

fn run(zone: i32, duration_mins: i32) -> Instruction {
    Instruction::RunZone { zone, duration_mins }
}

// ── Run / status ──────────────────────────────────────────────

#[test]
fn run_zone_reports_only_that_zone_on() {
    let mut rig = Rig::new();
    let report = rig.send(run(3, 10)).unwrap();

    let z3 = report.zone(3).unwrap();
    assert_eq!(z3.state, ZoneState::On);
    assert_eq!(z3.requested_on_mins, Some(10));
    assert_eq!(z3.elapsed_on_secs, Some(0));
    assert_eq!(report.zones_on().collect::<Vec<_>>(), vec![3]);

    for z in report.zone_list.iter().filter(|z| z.zone != 3) {
        assert_eq!(z.state, ZoneState::Off);
        assert_eq!(z.requested_on_mins, None);
        assert_eq!(z.elapsed_on_secs, None);
    }
    assert_eq!(rig.pins.level(rig.line(3)), Some(Level::On));
}

#[test]
fn status_lists_zones_in_map_order() {
    let rig = Rig::new();
    let ids: Vec<_> = rig.status().zone_list.iter().map(|z| z.zone).collect();
    let expected: Vec<_> = rig.config.zones.iter().map(|z| z.zone).collect();
    assert_eq!(ids, expected);
    assert!(rig.status().relay_board_enabled);
}

#[test]
fn elapsed_never_decreases() {
    let mut rig = Rig::new();
    rig.send(run(4, 30)).unwrap();

    let mut last = 0;
    for step in [0, 1, 5, 17, 60, 240] {
        rig.clock.advance(step);
        rig.idle_tick();
        let elapsed = rig.status().zone(4).unwrap().elapsed_on_secs.unwrap();
        assert!(elapsed >= last, "{elapsed} < {last}");
        last = elapsed;
    }
    assert_eq!(last, 323);
}

#[test]
fn get_status_changes_nothing() {
    let mut rig = Rig::new();
    rig.send(run(6, 5)).unwrap();
    let writes = rig.pins.write_count();
    let before = rig.status();

    let report = rig.send(Instruction::GetStatus).unwrap();
    assert_eq!(report, before);
    // Only the heartbeat wrote.
    assert_eq!(rig.pins.write_count(), writes + 1);
}

// ── Parameter rejection ───────────────────────────────────────

#[test]
fn invalid_parameters_leave_board_untouched() {
    let mut rig = Rig::new();
    rig.send(run(2, 10)).unwrap();
    let max = rig.ctl.max_runtime_mins() as i32;
    let last_zone = rig.config.zones.len() as i32;

    for (zone, mins) in [(0, 10), (last_zone + 1, 10), (-1, 10), (2, 0), (2, -5), (2, max + 1)] {
        let before = rig.status();
        let history = rig.pins.writes_to(rig.line(2)).len();
        rig.sink.clear();

        let err = rig.send(run(zone, mins)).unwrap_err();
        assert!(
            matches!(err, Error::InvalidParameters { zone: z, duration_mins: d } if z == zone && d == mins),
            "{err:?}"
        );
        assert_eq!(err.kind(), "InvalidParameters");
        assert_eq!(err.to_string(), format!("invalid zone/duration params: {zone} {mins}"));

        assert_eq!(rig.status(), before);
        assert_eq!(rig.pins.writes_to(rig.line(2)).len(), history);
        assert!(rig.sink.stops().is_empty());
        assert!(rig.sink.events.iter().any(|e| matches!(e, BoardEvent::RequestRejected(_))));
    }
}

#[test]
fn longest_allowed_duration_is_accepted() {
    let mut rig = Rig::new();
    let max = rig.ctl.max_runtime_mins() as i32;
    let report = rig.send(run(1, max)).unwrap();
    assert_eq!(report.zone(1).unwrap().requested_on_mins, Some(max as u32));
}

// ── Interlock ─────────────────────────────────────────────────

#[test]
fn new_zone_preempts_running_one() {
    let mut rig = Rig::new();
    rig.send(run(3, 10)).unwrap();
    let report = rig.send(run(5, 10)).unwrap();

    assert_eq!(report.zones_on().collect::<Vec<_>>(), vec![5]);
    assert_eq!(report.zone(3).unwrap().state, ZoneState::Off);
    assert_eq!(rig.pins.level(rig.line(3)), Some(Level::Off));
    assert_eq!(rig.sink.stops(), vec![(3, StopReason::Preempted)]);
}

#[test]
fn rerunning_same_zone_restarts_its_session() {
    let mut rig = Rig::new();
    rig.send(run(3, 10)).unwrap();
    rig.clock.advance(90);
    let report = rig.send(run(3, 5)).unwrap();

    let z3 = report.zone(3).unwrap();
    assert_eq!(z3.state, ZoneState::On);
    assert_eq!(z3.requested_on_mins, Some(5));
    assert_eq!(z3.elapsed_on_secs, Some(0));
    assert_eq!(rig.sink.stops(), vec![(3, StopReason::Preempted)]);
}

#[test]
fn never_more_than_one_zone_on() {
    let mut rig = Rig::new();
    for zone in [1, 16, 7, 7, 2, 12] {
        let report = rig.send(run(zone, 3)).unwrap();
        assert_eq!(report.zones_on().count(), 1);
        assert_eq!(rig.ctl.board().zones_on(), 1);
    }
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_when_idle_is_a_no_op() {
    let mut rig = Rig::new();
    let report = rig.send(Instruction::Reset).unwrap();
    assert!(all_zones(&report, ZoneState::Off));
    assert!(rig.sink.stops().is_empty());
    assert!(rig.sink.events.iter().any(|e| matches!(e, BoardEvent::BoardReset)));
}

#[test]
fn reset_stops_running_zone() {
    let mut rig = Rig::new();
    rig.send(run(9, 20)).unwrap();
    let report = rig.send(Instruction::Reset).unwrap();
    assert!(all_zones(&report, ZoneState::Off));
    assert_eq!(rig.sink.stops(), vec![(9, StopReason::Reset)]);
    assert!(rig.ctl.board().is_idle());
}

// ── Expiry ────────────────────────────────────────────────────

#[test]
fn zone_turns_off_when_duration_elapses() {
    let mut rig = Rig::new();
    rig.send(run(2, 1)).unwrap();

    rig.clock.advance(59);
    rig.idle_tick();
    assert_eq!(rig.state_of(2), ZoneState::On);

    rig.clock.advance(1);
    rig.idle_tick();
    assert_eq!(rig.state_of(2), ZoneState::Off);
    assert_eq!(rig.pins.level(rig.line(2)), Some(Level::Off));
    assert_eq!(rig.sink.stops(), vec![(2, StopReason::Expired)]);
    assert!(rig.status().zone(2).unwrap().requested_on_mins.is_none());
}

#[test]
fn long_stall_still_expires_on_next_tick() {
    let mut rig = Rig::new();
    rig.send(run(8, 2)).unwrap();
    rig.clock.advance(10 * 3600);
    rig.idle_tick();
    assert!(all_zones(&rig.status(), ZoneState::Off));
    assert_eq!(rig.sink.stops(), vec![(8, StopReason::Expired)]);
}

#[test]
fn failed_expiry_retries_every_tick() {
    let mut rig = Rig::new();
    rig.send(run(2, 1)).unwrap();
    rig.pins.fail_all_writes();
    rig.clock.advance(60);

    rig.idle_tick();
    assert!(all_zones(&rig.status(), ZoneState::Unknown));
    assert!(rig.ctl.board().session.is_some());
    rig.pins.heal();
    rig.pins.fail_pin(rig.line(2));
    let attempts = rig.pins.writes_to(rig.line(1)).len();
    rig.idle_tick();
    assert!(rig.pins.writes_to(rig.line(1)).len() > attempts, "expiry must retry the reset");
    rig.idle_tick();
    assert!(rig.ctl.is_untrusted());
    // Retries while already untrusted are not re-announced.
    assert_eq!(rig.sink.count_untrusted(), 1);

    rig.pins.heal();
    rig.idle_tick();
    assert!(!rig.ctl.is_untrusted());
    assert!(all_zones(&rig.status(), ZoneState::Off));
    assert!(rig.ctl.board().session.is_none());
    assert_eq!(rig.sink.stops(), vec![(2, StopReason::Expired)]);

    rig.send(run(4, 1)).unwrap();
    rig.pins.fail_all_writes();
    rig.clock.advance(60);
    rig.idle_tick();
    assert_eq!(rig.sink.count_untrusted(), 2);
}

// ── Driver faults ─────────────────────────────────────────────

#[test]
fn write_failure_makes_every_zone_unknown() {
    let mut rig = Rig::new();
    rig.send(run(3, 10)).unwrap();
    rig.pins.fail_all_writes();

    let err = rig.send(run(5, 10)).unwrap_err();
    assert!(matches!(err, Error::Driver(DriverError::Injected(_))), "{err:?}");
    assert_eq!(err.kind(), "DriverFailure");
    assert!(all_zones(&rig.status(), ZoneState::Unknown));
    assert!(rig.ctl.board().pins().iter().all(|p| *p == PinState::Unknown));

    rig.pins.heal();
    let report = rig.send(Instruction::Reset).unwrap();
    assert!(all_zones(&report, ZoneState::Off));
    assert_eq!(rig.sink.stops(), vec![(3, StopReason::Reset)]);
}

#[test]
fn single_pin_failure_still_untrusts_every_zone() {
    let mut rig = Rig::new();
    rig.pins.fail_pin(rig.line(11));
    let err = rig.send(Instruction::Reset).unwrap_err();
    assert!(matches!(err, Error::Driver(_)));
    assert!(all_zones(&rig.status(), ZoneState::Unknown));
}

#[test]
fn failed_reset_aborts_before_switching_on() {
    let mut rig = Rig::new();
    rig.pins.fail_pin(rig.line(7));
    let before = rig.pins.writes_to(rig.line(3)).len();

    let err = rig.send(run(3, 10)).unwrap_err();
    assert!(matches!(err, Error::Driver(DriverError::Injected(_))), "{err:?}");
    let attempted = &rig.pins.writes_to(rig.line(3))[before..];
    assert!(!attempted.contains(&Level::On), "{attempted:?}");
    assert_ne!(rig.pins.level(rig.line(3)), Some(Level::On));
    assert!(rig.ctl.board().session.is_none());
    assert!(all_zones(&rig.status(), ZoneState::Unknown));
    assert!(rig.sink.events.iter().all(|e| !matches!(e, BoardEvent::ZoneStarted { .. })));
}

#[test]
fn target_readback_mismatch_leaves_no_session() {
    let mut rig = Rig::new();
    rig.pins.stick_pin(rig.line(5), Level::Off);

    let err = rig.send(run(5, 10)).unwrap_err();
    assert!(matches!(err, Error::Driver(DriverError::Readback { .. })), "{err:?}");
    assert!(rig.ctl.board().session.is_none());
    assert!(all_zones(&rig.status(), ZoneState::Unknown));
    assert_eq!(rig.sink.count_untrusted(), 1);
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_toggles_once_per_tick() {
    let mut rig = Rig::new();
    for _ in 0..4 {
        rig.idle_tick();
    }
    assert_eq!(
        rig.pins.writes_to(rig.watchdog()),
        vec![Level::On, Level::Off, Level::On, Level::Off]
    );
    assert_eq!(rig.ctl.board().watchdog_pin, PinState::Off);
}

#[test]
fn disable_stops_heartbeat_and_enable_resumes_it() {
    let mut rig = Rig::new();
    rig.idle_tick();

    let report = rig.send(Instruction::Disable).unwrap();
    assert!(!report.relay_board_enabled);
    for _ in 0..3 {
        rig.idle_tick();
    }
    assert_eq!(rig.pins.writes_to(rig.watchdog()), vec![Level::On]);

    let report = rig.send(Instruction::Enable).unwrap();
    assert!(report.relay_board_enabled);
    rig.idle_tick();
    assert_eq!(
        rig.pins.writes_to(rig.watchdog()),
        vec![Level::On, Level::Off, Level::On]
    );
    assert_eq!(
        rig.sink
            .events
            .iter()
            .filter(|e| matches!(e, BoardEvent::RelayBoardEnabled(_)))
            .count(),
        2
    );
}

#[test]
fn disabled_board_still_switches_zones() {
    let mut rig = Rig::new();
    rig.send(Instruction::Disable).unwrap();
    let report = rig.send(run(4, 1)).unwrap();
    assert_eq!(report.zones_on().collect::<Vec<_>>(), vec![4]);
    assert!(!report.relay_board_enabled);
}

#[test]
fn tick_count_advances_with_and_without_instructions() {
    let mut rig = Rig::new();
    rig.idle_tick();
    rig.send(Instruction::GetStatus).unwrap();
    rig.idle_tick();
    assert_eq!(rig.ctl.tick_count(), 3);
}
