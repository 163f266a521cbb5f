//! Shared message pipeline — channel-agnostic turn processing.
//!
//! A channel adapter implements [`ChatSink`](sink::ChatSink) and calls
//! [`process_prompt`](process::process_prompt); everything between accepting
//! a prompt and committing the assistant turn lives here, once.

pub mod process;
pub mod respond;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use process::{process_prompt, TurnOutcome};
pub use respond::{stream_reply, TurnError};
pub use sink::{ChatSink, MessageRef, SinkError};
