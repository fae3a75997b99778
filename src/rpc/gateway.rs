//! Caller-facing entry point to the command processor.
//!
//! [`Gateway::submit`] is a synchronous remote call: publish one
//! instruction, block until its response arrives or the bounded wait
//! expires.  Expiry yields [`Error::ResponseTimeout`], which means
//! *outcome unknown*.  There is no cancellation: the instruction may
//! still run on the next tick.

use std::sync::Arc;
use std::time::Duration;

use async_io_mini::Timer;
use futures_lite::future;

use super::channels::Mailbox;
use crate::app::commands::{Instruction, Response};
use crate::error::Error;

#[derive(Clone)]
pub struct Gateway {
    mailbox: Arc<Mailbox>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(mailbox: Arc<Mailbox>, timeout: Duration) -> Self {
        Self { mailbox, timeout }
    }

    /// Blocking submit.  Safe to call from many threads; calls are served
    /// one at a time.
    pub fn submit(&self, instruction: Instruction) -> Response {
        future::block_on(self.submit_async(instruction))
    }

    pub async fn submit_async(&self, instruction: Instruction) -> Response {
        let mailbox = &self.mailbox;
        let exchange = async {
            let _gate = mailbox.acquire().await;
            let seq = mailbox.publish(instruction);
            mailbox.response_for(seq).await
        };
        let deadline = async {
            Timer::after(self.timeout).await;
            Err(Error::ResponseTimeout)
        };
        future::or(exchange, deadline).await
    }

    // ── Query / mutations ─────────────────────────────────────

    pub fn get_status(&self) -> Response {
        self.submit(Instruction::GetStatus)
    }

    pub fn reset(&self) -> Response {
        self.submit(Instruction::Reset)
    }

    pub fn enable(&self) -> Response {
        self.submit(Instruction::Enable)
    }

    pub fn disable(&self) -> Response {
        self.submit(Instruction::Disable)
    }

    pub fn run_zone(&self, zone: i32, duration_mins: i32) -> Response {
        self.submit(Instruction::RunZone { zone, duration_mins })
    }
}
