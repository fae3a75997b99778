//! Gateway ↔ processor round trips across threads.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use sprinkler::adapters::time::ManualClock;
use sprinkler::app::commands::Instruction;
use sprinkler::app::service::Controller;
use sprinkler::app::status::ZoneState;
use sprinkler::config::SystemConfig;
use sprinkler::drivers::sim::SimulatedPins;
use sprinkler::error::Error;
use sprinkler::rpc::channels::{GATE_WAITERS, Mailbox};
use sprinkler::rpc::codec::{decode_request, encode_response};
use sprinkler::rpc::engine::{self, Processor};
use sprinkler::rpc::gateway::Gateway;

use super::mock_hw::RecordingSink;

const TICK: Duration = Duration::from_millis(5);
const WAIT: Duration = Duration::from_secs(5);

fn processor(mailbox: Arc<Mailbox>) -> (Processor<SimulatedPins, ManualClock, RecordingSink>, SimulatedPins) {
    let pins = SimulatedPins::new();
    let mut ctl = Controller::new(&SystemConfig::default(), pins.clone(), ManualClock::new(0)).unwrap();
    let mut sink = RecordingSink::new();
    ctl.start(true, &mut sink).unwrap();
    (Processor::new(ctl, mailbox, sink, TICK), pins)
}

fn running_gateway() -> (Gateway, SimulatedPins) {
    let mailbox = Arc::new(Mailbox::new());
    let (p, pins) = processor(mailbox.clone());
    engine::spawn(p).unwrap();
    (Gateway::new(mailbox, WAIT), pins)
}

#[test]
fn run_zone_round_trip() {
    let (gw, _pins) = running_gateway();

    let report = gw.run_zone(3, 10).unwrap();
    assert_eq!(report.zones_on().collect::<Vec<_>>(), vec![3]);

    let report = gw.get_status().unwrap();
    assert_eq!(report.zone(3).unwrap().state, ZoneState::On);

    let report = gw.reset().unwrap();
    assert_eq!(report.zones_on().count(), 0);
}

#[test]
fn rejection_travels_back_to_caller() {
    let (gw, _pins) = running_gateway();
    let err = gw.run_zone(0, 10).unwrap_err();
    assert!(matches!(err, Error::InvalidParameters { zone: 0, duration_mins: 10 }));
}

#[test]
fn enable_and_disable_round_trip() {
    let (gw, _pins) = running_gateway();
    assert!(!gw.disable().unwrap().relay_board_enabled);
    assert!(gw.enable().unwrap().relay_board_enabled);
}

#[test]
fn times_out_without_a_processor() {
    let mailbox = Arc::new(Mailbox::new());
    let gw = Gateway::new(mailbox.clone(), Duration::from_millis(50));

    let err = gw.submit(Instruction::GetStatus).unwrap_err();
    assert!(matches!(err, Error::ResponseTimeout));
    assert_eq!(err.kind(), "ResponseTimeout");
    // Not cancelled: the instruction is still waiting for a tick.
    assert!(mailbox.has_pending_instruction());
}

#[test]
fn overfull_gate_queue_still_times_out_on_schedule() {
    let mailbox = Arc::new(Mailbox::new());
    let gw = Gateway::new(mailbox, Duration::from_millis(300));
    let started = Instant::now();

    let callers: Vec<_> = (0..GATE_WAITERS + 4)
        .map(|_| {
            let gw = gw.clone();
            thread::spawn(move || gw.submit(Instruction::GetStatus))
        })
        .collect();
    for caller in callers {
        let response = caller.join().unwrap();
        assert!(matches!(response, Err(Error::ResponseTimeout)), "{response:?}");
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn late_response_is_not_delivered_to_next_caller() {
    let mailbox = Arc::new(Mailbox::new());
    let gw = Gateway::new(mailbox.clone(), Duration::from_millis(50));
    let (mut p, _pins) = processor(mailbox.clone());

    // First caller gives up; the processor then answers it late.
    assert!(matches!(gw.run_zone(0, 1), Err(Error::ResponseTimeout)));
    assert!(p.poll());

    // The next caller must see its own answer, not the stale rejection.
    let next = {
        let gw = Gateway::new(mailbox.clone(), WAIT);
        thread::spawn(move || gw.get_status())
    };
    while !mailbox.has_pending_instruction() {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(p.poll());
    assert!(next.join().unwrap().is_ok());
}

#[test]
fn concurrent_callers_keep_one_zone_on() {
    let (gw, _pins) = running_gateway();

    let handles: Vec<_> = (1..=8)
        .map(|zone| {
            let gw = gw.clone();
            thread::spawn(move || gw.run_zone(zone, 5))
        })
        .collect();
    for h in handles {
        let report = h.join().unwrap().unwrap();
        assert_eq!(report.zones_on().count(), 1);
    }

    let report = gw.get_status().unwrap();
    assert_eq!(report.zones_on().count(), 1);
    let on = report.zones_on().next().unwrap();
    assert!((1..=8).contains(&on));
}

#[test]
fn console_line_round_trip() {
    let (gw, _pins) = running_gateway();
    let instruction = decode_request(r#"{"op":"runZone","zone":7,"durationMins":2}"#).unwrap();
    let line = encode_response(&gw.submit(instruction));

    let v: serde_json::Value = serde_json::from_str(&line).unwrap();
    let zones = v["data"]["zoneList"].as_array().unwrap();
    let z7 = zones.iter().find(|z| z["zone"] == 7).unwrap();
    assert_eq!(z7["state"], "ON");
    assert_eq!(z7["requestedOnMins"], 2);
    assert_eq!(z7["elapsedOnSecs"], 0);
    assert_eq!(v["data"]["relayBoardEnabled"], true);
}
