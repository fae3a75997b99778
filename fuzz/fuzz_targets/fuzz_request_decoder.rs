//! Fuzz target: `decode_request` and the controller behind it
//!
//! Feeds arbitrary bytes to the console request decoder.  Anything that
//! decodes is run through a controller on simulated pins, which must
//! answer without panicking and never report more than one zone on.
//!
//! cargo fuzz run fuzz_request_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sprinkler::adapters::time::ManualClock;
use sprinkler::app::events::BoardEvent;
use sprinkler::app::ports::EventSink;
use sprinkler::app::service::Controller;
use sprinkler::config::SystemConfig;
use sprinkler::drivers::sim::SimulatedPins;
use sprinkler::rpc::codec::{decode_request, encode_bad_request, encode_response};

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &BoardEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut ctl = Controller::new(&SystemConfig::default(), SimulatedPins::new(), ManualClock::new(0))
        .expect("default config is valid");

    for line in text.lines() {
        match decode_request(line) {
            Ok(instruction) => {
                let response = ctl
                    .tick(Some(instruction), &mut NullSink)
                    .expect("instruction answered");
                assert!(!encode_response(&response).is_empty());
                assert!(ctl.status().zones_on().count() <= 1);
            }
            Err(e) => assert!(encode_bad_request(&e).contains("BadRequest")),
        }
    }
});
