//! Sync server error types.
//!
//! `SyncError` covers the three failure families the channel can report:
//! authentication failures during join, document operation failures, and
//! transformation failures. Each variant maps to a stable `reason` string
//! that goes on the wire unchanged, so clients can match on it.

use thiserror::Error;

use crate::store::documents::Document;

/// Errors surfaced by the sync subsystem.
///
/// Variants that carry state (`Conflict`, `VersionMismatch`) hold the
/// current document so the error reply can include everything the client
/// needs to resolve without a second round trip.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A join was attempted without one of the required auth parameters.
    #[error("missing required join parameters")]
    MissingParams,

    /// The `timestamp` join parameter was not an integer.
    #[error("timestamp is not a valid integer")]
    InvalidTimestamp,

    /// The signature timestamp fell outside the acceptance window.
    #[error("timestamp outside the acceptance window")]
    TimestampExpired,

    /// No active credential matches the presented `api_key`.
    #[error("unknown or inactive api key")]
    InvalidApiKey,

    /// The presented signature did not match the recomputed one.
    #[error("signature mismatch")]
    InvalidSignature,

    /// The addressed document does not exist (or is soft-deleted).
    #[error("document not found")]
    NotFound,

    /// A create collided with an existing document id.
    #[error("document {} already exists", .existing.id)]
    Conflict {
        /// The document already stored under the requested id.
        existing: Document,
    },

    /// The caller's `expected_revision` no longer matches the stored one.
    #[error("revision mismatch: current revision is {}", .current.sync_revision)]
    VersionMismatch {
        /// The current document state, returned for client-side resolution.
        current: Document,
    },

    /// The submitted patch failed to apply under RFC 6902 semantics.
    #[error("invalid patch: {message}")]
    InvalidPatch { message: String },

    /// The document insert transaction failed to commit.
    #[error("insert failed: {message}")]
    InsertFailed { message: String },

    /// The document update transaction failed to commit.
    #[error("update failed: {message}")]
    UpdateFailed { message: String },

    /// The document delete transaction failed to commit.
    #[error("delete failed: {message}")]
    DeleteFailed { message: String },

    /// Operational transformation failed (path arithmetic error).
    #[error("transform failed: {0}")]
    Transform(String),

    /// A joined session sent an operation this server does not know.
    #[error("unknown event: {event}")]
    UnknownEvent { event: String },

    /// Underlying database error outside a mapped mutation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Create an `InvalidPatch` error from any displayable cause.
    pub fn invalid_patch(message: impl ToString) -> Self {
        Self::InvalidPatch {
            message: message.to_string(),
        }
    }

    /// Create a `Transform` error from any displayable cause.
    pub fn transform(message: impl ToString) -> Self {
        Self::Transform(message.to_string())
    }

    /// The stable `reason` string used on the wire for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParams => "missing_params",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::TimestampExpired => "timestamp_expired",
            Self::InvalidApiKey => "invalid_api_key",
            Self::InvalidSignature => "invalid_signature",
            Self::NotFound => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::InvalidPatch { .. } => "invalid_patch",
            Self::InsertFailed { .. } => "insert_failed",
            Self::UpdateFailed { .. } => "update_failed",
            Self::DeleteFailed { .. } => "delete_failed",
            Self::Transform(_) => "transform_failed",
            Self::UnknownEvent { .. } => "unknown_event",
            Self::Database(_) => "database_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}
