//! Message framing for the sync channel.

/// Request, reply, and broadcast envelopes
pub mod envelope;

pub use envelope::{Broadcast, Reply, ReplyStatus, Request};
