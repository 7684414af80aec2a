//! Wire envelopes for the sync channel.
//!
//! Frames are JSON text. A request carries a client-chosen `ref` which the
//! reply echoes; broadcasts carry no `ref` because nobody asked for them.
//! All keys on the wire are strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::SyncError;

/// An inbound request frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Client-chosen reference, echoed back on the reply.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Target topic; only meaningful on `join`.
    #[serde(default)]
    pub topic: Option<String>,
    /// Operation name, e.g. `create_document`.
    pub event: String,
    /// Operation parameters.
    #[serde(default)]
    pub payload: Value,
}

/// Reply status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

/// An outbound reply frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "ref")]
    pub reference: String,
    pub status: ReplyStatus,
    pub payload: Value,
}

impl Reply {
    /// A successful reply echoing `reference`.
    pub fn ok(reference: impl Into<String>, payload: Value) -> Self {
        Self {
            reference: reference.into(),
            status: ReplyStatus::Ok,
            payload,
        }
    }

    /// An error reply echoing `reference`.
    pub fn error(reference: impl Into<String>, payload: Value) -> Self {
        Self {
            reference: reference.into(),
            status: ReplyStatus::Error,
            payload,
        }
    }

    /// An error reply built from a [`SyncError`]'s wire payload.
    pub fn from_error(reference: impl Into<String>, error: &SyncError) -> Self {
        Self::error(reference, error.to_reply())
    }
}

/// An outbound broadcast frame, fanned out to every other session on the
/// originating topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    pub event: String,
    pub payload: Value,
}

impl Broadcast {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// A string payload parameter.
pub fn str_param(payload: &Value, key: &str) -> Option<String> {
    payload[key].as_str().map(str::to_string)
}

/// A UUID payload parameter, sent as its string form.
pub fn uuid_param(payload: &Value, key: &str) -> Option<Uuid> {
    payload[key].as_str().and_then(|raw| Uuid::parse_str(raw).ok())
}

/// An integer payload parameter. Strict: numeric strings are not accepted.
pub fn int_param(payload: &Value, key: &str) -> Option<i64> {
    payload[key].as_i64()
}

/// A present, non-null payload parameter.
pub fn value_param<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    match &payload[key] {
        Value::Null => None,
        value => Some(value),
    }
}
