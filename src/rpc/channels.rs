//! Single-slot mailboxes between gateway callers and the command processor.
//!
//! Uses `embassy-sync` signals: each slot holds at most one value and a
//! new publish overwrites an unread one (last writer wins).  A one-permit
//! FIFO semaphore keeps at most one caller in flight; queued callers sleep
//! until they reach the head of the queue.
//!
//! ```text
//! ┌──────────────┐  Envelope<Instruction>  ┌──────────────┐
//! │   Gateway    │────────────────────────▶│  Processor   │
//! │  (callers)   │◀────────────────────────│  (one tick)  │
//! └──────────────┘   Envelope<Response>    └──────────────┘
//! ```
//!
//! Every instruction is stamped with a sequence number that the processor
//! echoes on its response.  A caller only accepts a response carrying its
//! own number, so a reply meant for an earlier caller that gave up waiting
//! is never handed to the next one.

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::semaphore::{FairSemaphore, Semaphore, SemaphoreReleaser};
use embassy_sync::signal::Signal;
use log::{debug, warn};

use crate::app::commands::{Instruction, Response};

/// Callers that may queue for the gate at once.
pub const GATE_WAITERS: usize = 16;

/// Back-off when the gate's wait queue is full.
const GATE_RETRY: Duration = Duration::from_millis(50);

type Gate = FairSemaphore<CriticalSectionRawMutex, GATE_WAITERS>;

/// Held by the caller that owns the mailbox; dropping it admits the next.
pub type GatePass<'a> = SemaphoreReleaser<'a, Gate>;

/// A value tagged with the sequence number of the request it belongs to.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub seq: u64,
    pub body: T,
}

pub struct Mailbox {
    instruction: Signal<CriticalSectionRawMutex, Envelope<Instruction>>,
    response: Signal<CriticalSectionRawMutex, Envelope<Response>>,
    gate: Gate,
    next_seq: AtomicU64,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            instruction: Signal::new(),
            response: Signal::new(),
            gate: FairSemaphore::new(1),
            next_seq: AtomicU64::new(1),
        }
    }

    // ── Caller side ───────────────────────────────────────────

    /// Wait for the single-flight gate, in arrival order.
    pub async fn acquire(&self) -> GatePass<'_> {
        loop {
            match self.gate.acquire(1).await {
                Ok(pass) => return pass,
                Err(_) => {
                    warn!("{} callers already queued, retrying", GATE_WAITERS);
                    Timer::after(GATE_RETRY).await;
                }
            }
        }
    }

    /// Drop any stale response, then publish `instruction`.  Returns the
    /// sequence number its response will carry.
    pub fn publish(&self, instruction: Instruction) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.response.reset();
        if self.instruction.signaled() {
            debug!("seq {}: replacing an instruction that was never taken", seq);
        }
        self.instruction.signal(Envelope {
            seq,
            body: instruction,
        });
        seq
    }

    /// Wait for the response to `seq`, discarding any other.
    pub async fn response_for(&self, seq: u64) -> Response {
        loop {
            let envelope = self.response.wait().await;
            if envelope.seq == seq {
                return envelope.body;
            }
            debug!("discarding stale response seq {} (waiting for {})", envelope.seq, seq);
        }
    }

    // ── Processor side ────────────────────────────────────────

    /// Take the pending instruction, leaving the slot empty.
    pub fn take_instruction(&self) -> Option<Envelope<Instruction>> {
        self.instruction.try_take()
    }

    pub fn post_response(&self, seq: u64, response: Response) {
        self.response.signal(Envelope {
            seq,
            body: response,
        });
    }

    pub fn has_pending_instruction(&self) -> bool {
        self.instruction.signaled()
    }
}
