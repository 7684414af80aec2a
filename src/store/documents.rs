//! Transactional document storage.
//!
//! Every mutation commits two writes atomically: the document row and one
//! appended change event. Update concurrency is optimistic: the caller
//! supplies the revision it last saw, and the update statement re-checks
//! it, so two racing writers cannot both commit against the same base
//! revision. Deletes are tombstones; the row stays for audit and undo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::SyncError;
use crate::sync::patch;

/// A document row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: Value,
    pub sync_revision: i32,
    pub content_hash: Option<String>,
    pub title: Option<String>,
    pub size_bytes: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DOCUMENT_COLUMNS: &str = "id, user_id, content, sync_revision, content_hash, title, \
                                size_bytes, deleted_at, created_at, updated_at";

/// Hash of the canonical JSON encoding of `content`.
///
/// serde_json keeps object keys sorted, so `to_string` is already a
/// canonical encoding. Non-object content hashes to `None`; the function
/// is total over all JSON values.
pub fn compute_content_hash(content: &Value) -> Option<String> {
    if !content.is_object() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(content.to_string().as_bytes());
    Some(hex::encode(hasher.finalize()))
}

/// Whether `hash` matches the current hash of `content`.
pub fn verify_content_hash(content: &Value, hash: &str) -> bool {
    compute_content_hash(content).as_deref() == Some(hash)
}

/// Best-effort title: the string under `content.title`, if present.
pub fn extract_title(content: &Value) -> Option<String> {
    content["title"].as_str().map(str::to_string)
}

/// Byte length of the JSON encoding of `content`.
pub fn content_size_bytes(content: &Value) -> i32 {
    content.to_string().len() as i32
}

/// Create a document and append its `create` event.
///
/// The document id is client-chosen and globally unique; a colliding id
/// returns `conflict` carrying the existing row.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
    content: Value,
) -> Result<Document, SyncError> {
    let now = Utc::now();
    let content_hash = compute_content_hash(&content);
    let title = extract_title(&content);
    let size_bytes = content_size_bytes(&content);

    let mut tx = pool.begin().await.map_err(insert_failed)?;

    let inserted = sqlx::query_as::<_, Document>(&format!(
        r#"
        INSERT INTO documents (id, user_id, content, sync_revision, content_hash, title,
                               size_bytes, created_at, updated_at)
        VALUES ($1, $2, $3, 1, $4, $5, $6, $7, $7)
        RETURNING {DOCUMENT_COLUMNS}
        "#
    ))
    .bind(document_id)
    .bind(user_id)
    .bind(&content)
    .bind(&content_hash)
    .bind(&title)
    .bind(size_bytes)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let document = match inserted {
        Ok(document) => document,
        Err(e) if is_unique_violation(&e) => {
            drop(tx);
            let existing = fetch_by_id(pool, document_id)
                .await?
                .ok_or_else(|| insert_failed(e))?;
            return Err(SyncError::Conflict { existing });
        }
        Err(e) => return Err(insert_failed(e)),
    };

    append_change_event(&mut tx, document_id, user_id, "create", Some(&content), None, now)
        .await
        .map_err(insert_failed)?;

    tx.commit().await.map_err(insert_failed)?;

    tracing::debug!("[Store] Created document {document_id} for user {user_id}");
    Ok(document)
}

/// Apply a patch to a document and append its `update` event.
///
/// The caller's `expected_revision` must equal the stored `sync_revision`;
/// otherwise the current document comes back in a `version_mismatch` error
/// for client-side resolution. The committed event records the original
/// wire patch forward and the computed inverse backward.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
    wire_patch: &Value,
    expected_revision: i32,
) -> Result<Document, SyncError> {
    let mut tx = pool.begin().await.map_err(update_failed)?;

    let current = fetch_active_in_tx(&mut tx, user_id, document_id)
        .await?
        .ok_or(SyncError::NotFound)?;

    if current.sync_revision != expected_revision {
        return Err(SyncError::VersionMismatch { current });
    }

    let normalized = patch::normalize(wire_patch)?;
    let new_content = patch::apply(&current.content, &normalized)?;
    let reverse_patch = patch::to_wire(&patch::inverse(&new_content, &current.content))?;

    let now = Utc::now();
    let updated = sqlx::query_as::<_, Document>(&format!(
        r#"
        UPDATE documents
        SET content = $1, content_hash = $2, title = $3, size_bytes = $4,
            sync_revision = sync_revision + 1, updated_at = $5
        WHERE id = $6 AND user_id = $7 AND sync_revision = $8 AND deleted_at IS NULL
        RETURNING {DOCUMENT_COLUMNS}
        "#
    ))
    .bind(&new_content)
    .bind(compute_content_hash(&new_content))
    .bind(extract_title(&new_content))
    .bind(content_size_bytes(&new_content))
    .bind(now)
    .bind(document_id)
    .bind(user_id)
    .bind(expected_revision)
    .fetch_optional(&mut *tx)
    .await
    .map_err(update_failed)?;

    let Some(updated) = updated else {
        // A racing writer committed between our read and the guarded
        // update; surface whatever revision won.
        drop(tx);
        let current = fetch_active(pool, user_id, document_id)
            .await?
            .ok_or(SyncError::NotFound)?;
        return Err(SyncError::VersionMismatch { current });
    };

    append_change_event(
        &mut tx,
        document_id,
        user_id,
        "update",
        Some(wire_patch),
        Some(&reverse_patch),
        now,
    )
    .await
    .map_err(update_failed)?;

    tx.commit().await.map_err(update_failed)?;

    tracing::debug!(
        "[Store] Updated document {document_id} to revision {}",
        updated.sync_revision
    );
    Ok(updated)
}

/// Tombstone a document and append its `delete` event.
///
/// `sync_revision` is left alone; the event's reverse patch is the prior
/// content so the delete can be undone.
pub async fn delete(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<Document, SyncError> {
    let mut tx = pool.begin().await.map_err(delete_failed)?;

    let current = fetch_active_in_tx(&mut tx, user_id, document_id)
        .await?
        .ok_or(SyncError::NotFound)?;

    let now = Utc::now();
    let deleted = sqlx::query_as::<_, Document>(&format!(
        r#"
        UPDATE documents
        SET deleted_at = $1
        WHERE id = $2 AND user_id = $3 AND deleted_at IS NULL
        RETURNING {DOCUMENT_COLUMNS}
        "#
    ))
    .bind(now)
    .bind(document_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(delete_failed)?;

    append_change_event(
        &mut tx,
        document_id,
        user_id,
        "delete",
        None,
        Some(&current.content),
        now,
    )
    .await
    .map_err(delete_failed)?;

    tx.commit().await.map_err(delete_failed)?;

    tracing::debug!("[Store] Deleted document {document_id} for user {user_id}");
    Ok(deleted)
}

/// All live documents for a user, most recently updated first.
pub async fn list_non_deleted(pool: &PgPool, user_id: Uuid) -> Result<Vec<Document>, SyncError> {
    let documents = sqlx::query_as::<_, Document>(&format!(
        r#"
        SELECT {DOCUMENT_COLUMNS}
        FROM documents
        WHERE user_id = $1 AND deleted_at IS NULL
        ORDER BY updated_at DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

/// Fetch a document by id alone, tombstoned or not. Used to report create
/// conflicts, which are keyed on the global id.
async fn fetch_by_id(pool: &PgPool, document_id: Uuid) -> Result<Option<Document>, SyncError> {
    let document = sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
    ))
    .bind(document_id)
    .fetch_optional(pool)
    .await?;

    Ok(document)
}

async fn fetch_active(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<Option<Document>, SyncError> {
    let document = sqlx::query_as::<_, Document>(&format!(
        r#"
        SELECT {DOCUMENT_COLUMNS}
        FROM documents
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#
    ))
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(document)
}

async fn fetch_active_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<Option<Document>, SyncError> {
    let document = sqlx::query_as::<_, Document>(&format!(
        r#"
        SELECT {DOCUMENT_COLUMNS}
        FROM documents
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#
    ))
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(document)
}

async fn append_change_event(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    user_id: Uuid,
    event_type: &str,
    forward_patch: Option<&Value>,
    reverse_patch: Option<&Value>,
    server_timestamp: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO change_events (document_id, user_id, event_type, forward_patch,
                                   reverse_patch, applied, server_timestamp, created_at)
        VALUES ($1, $2, $3, $4, $5, true, $6, $6)
        "#,
    )
    .bind(document_id)
    .bind(user_id)
    .bind(event_type)
    .bind(forward_patch)
    .bind(reverse_patch)
    .bind(server_timestamp)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn insert_failed(error: sqlx::Error) -> SyncError {
    SyncError::InsertFailed {
        message: error.to_string(),
    }
}

fn update_failed(error: sqlx::Error) -> SyncError {
    SyncError::UpdateFailed {
        message: error.to_string(),
    }
}

fn delete_failed(error: sqlx::Error) -> SyncError {
    SyncError::DeleteFailed {
        message: error.to_string(),
    }
}
