//! Request plumbing between callers and the command processor.
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌─────────────┐   ┌────────────┐
//! │  Console   │──▶│  Gateway  │──▶│   Mailbox   │──▶│ Processor  │
//! │ (codec)    │◀──│ (bounded  │◀──│ (one slot   │◀──│ (tick loop │
//! │            │   │  wait)    │   │  each way)  │   │  thread)   │
//! └────────────┘   └───────────┘   └─────────────┘   └────────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod engine;
pub mod gateway;
