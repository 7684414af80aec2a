//! Conversion of `SyncError` into wire error payloads.
//!
//! Every handler failure becomes an error reply on the channel. The payload
//! always carries `reason` (stable string) and `message` (human-readable);
//! conflict and version-mismatch errors additionally carry the state the
//! client needs to drive resolution locally.

use serde_json::{json, Value};

use crate::error::types::SyncError;

impl SyncError {
    /// Build the error reply payload for this error.
    ///
    /// ```
    /// use relaypad::error::SyncError;
    ///
    /// let payload = SyncError::NotFound.to_reply();
    /// assert_eq!(payload["reason"], "not_found");
    /// ```
    pub fn to_reply(&self) -> Value {
        let mut payload = json!({
            "reason": self.kind(),
            "message": self.to_string(),
        });

        match self {
            Self::Conflict { existing } => {
                payload["existing_id"] = json!(existing.id);
                payload["sync_revision"] = json!(existing.sync_revision);
            }
            Self::VersionMismatch { current } => {
                payload["current_revision"] = json!(current.sync_revision);
                payload["current_content"] = current.content.clone();
                payload["current_hash"] = json!(current.content_hash);
            }
            _ => {}
        }

        payload
    }
}
