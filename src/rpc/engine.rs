//! Processor loop: drives the [`Controller`] at a fixed tick period.
//!
//! Each tick takes at most one instruction from the [`Mailbox`], runs the
//! controller tick and posts the response under the instruction's
//! sequence number.  Ticks are scheduled against a deadline; when a tick
//! overruns (a slow `gpioset`, say) the schedule is re-anchored rather
//! than bursting to catch up.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};

use super::channels::Mailbox;
use crate::app::ports::{Clock, EventSink, PinDriver};
use crate::app::service::Controller;

const THREAD_NAME: &str = "gpio-loop";

pub struct Processor<D, C, S> {
    controller: Controller<D, C>,
    mailbox: Arc<Mailbox>,
    sink: S,
    period: Duration,
}

impl<D: PinDriver, C: Clock, S: EventSink> Processor<D, C, S> {
    pub fn new(controller: Controller<D, C>, mailbox: Arc<Mailbox>, sink: S, period: Duration) -> Self {
        Self {
            controller,
            mailbox,
            sink,
            period,
        }
    }

    /// Run a single tick.  Returns `true` if an instruction was handled.
    pub fn poll(&mut self) -> bool {
        let pending = self.mailbox.take_instruction();
        let (seq, instruction) = match pending {
            Some(envelope) => (Some(envelope.seq), Some(envelope.body)),
            None => (None, None),
        };

        let response = self.controller.tick(instruction, &mut self.sink);

        match (seq, response) {
            (Some(seq), Some(response)) => {
                self.mailbox.post_response(seq, response);
                true
            }
            _ => false,
        }
    }

    /// Tick forever.
    pub fn run(mut self) -> ! {
        info!("Processor running, tick every {:?}", self.period);
        let mut next = Instant::now() + self.period;
        loop {
            self.poll();

            let now = Instant::now();
            if now < next {
                thread::sleep(next - now);
                next += self.period;
            } else {
                warn!("tick overran by {:?}", now - next);
                next = now + self.period;
            }
        }
    }

    pub fn controller(&self) -> &Controller<D, C> {
        &self.controller
    }
}

/// Move `processor` onto its own named thread.
pub fn spawn<D, C, S>(processor: Processor<D, C, S>) -> io::Result<JoinHandle<()>>
where
    D: PinDriver + Send + 'static,
    C: Clock + Send + 'static,
    S: EventSink + Send + 'static,
{
    thread::Builder::new()
        .name(THREAD_NAME.into())
        .spawn(move || {
            processor.run();
        })
}
