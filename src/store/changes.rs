//! Change-log reads.
//!
//! The `change_events` table is append-only; `sequence` is assigned by the
//! database at insert and is strictly increasing per user along insertion
//! order. Clients recover incrementally by polling `events_since` with the
//! last sequence they applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Default page size for incremental reads.
pub const DEFAULT_CHANGES_LIMIT: i64 = 100;

/// One appended change event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChangeEvent {
    pub sequence: i64,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    pub forward_patch: Option<Value>,
    pub reverse_patch: Option<Value>,
    pub applied: bool,
    pub server_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Events for a user after `last_sequence`, ascending, capped at `limit`.
pub async fn events_since(
    pool: &PgPool,
    user_id: Uuid,
    last_sequence: i64,
    limit: i64,
) -> Result<Vec<ChangeEvent>, sqlx::Error> {
    sqlx::query_as::<_, ChangeEvent>(
        r#"
        SELECT sequence, document_id, user_id, event_type, forward_patch,
               reverse_patch, applied, server_timestamp, created_at
        FROM change_events
        WHERE user_id = $1 AND sequence > $2
        ORDER BY sequence ASC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(last_sequence)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// The highest sequence recorded for a user, or `0` when there is none.
pub async fn latest_sequence(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(sequence), 0) FROM change_events WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
