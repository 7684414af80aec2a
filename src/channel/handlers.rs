//! Typed message handlers for joined sessions.
//!
//! Each handler extracts its parameters from the request payload, calls
//! into the store or the transformer, and returns the reply payload plus
//! an optional broadcast for the session's topic. Handlers never panic on
//! bad input; every failure becomes an error reply.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::SyncError;
use crate::server::state::AppState;
use crate::store::{changes, documents};
use crate::sync::transform;
use crate::wire::envelope::{int_param, uuid_param, value_param};
use crate::wire::Broadcast;

/// Reply payload plus the broadcast to fan out on success, if any.
pub type HandlerResult = Result<(Value, Option<Broadcast>), SyncError>;

/// Route a message from a joined session to its handler.
pub async fn dispatch(state: &AppState, user_id: Uuid, event: &str, payload: &Value) -> HandlerResult {
    match event {
        "create_document" => create_document(state, user_id, payload).await,
        "update_document" => update_document(state, user_id, payload).await,
        "delete_document" => delete_document(state, user_id, payload).await,
        "request_full_sync" => request_full_sync(state, user_id).await,
        "get_changes_since" => get_changes_since(state, user_id, payload).await,
        "transform_operations" => transform_operations(payload),
        _ => Err(SyncError::UnknownEvent {
            event: event.to_string(),
        }),
    }
}

/// `create_document {id, content}`
async fn create_document(state: &AppState, user_id: Uuid, payload: &Value) -> HandlerResult {
    let document_id = uuid_param(payload, "id").ok_or(SyncError::MissingParams)?;
    let content = value_param(payload, "content")
        .ok_or(SyncError::MissingParams)?
        .clone();

    let document = documents::create(&state.pool, user_id, document_id, content).await?;

    let reply = json!({
        "document_id": document.id,
        "sync_revision": document.sync_revision,
        "content_hash": document.content_hash,
    });
    let broadcast = Broadcast::new(
        "document_created",
        json!({
            "document_id": document.id,
            "content": document.content,
            "sync_revision": document.sync_revision,
            "content_hash": document.content_hash,
        }),
    );

    Ok((reply, Some(broadcast)))
}

/// `update_document {document_id, patch, expected_revision}`
///
/// `expected_revision` must be sent as an integer; it is compared against
/// the stored `sync_revision`.
async fn update_document(state: &AppState, user_id: Uuid, payload: &Value) -> HandlerResult {
    let document_id = uuid_param(payload, "document_id").ok_or(SyncError::MissingParams)?;
    let patch = value_param(payload, "patch").ok_or(SyncError::MissingParams)?;
    let expected_revision = int_param(payload, "expected_revision")
        .and_then(|raw| i32::try_from(raw).ok())
        .ok_or(SyncError::MissingParams)?;

    let document =
        documents::update(&state.pool, user_id, document_id, patch, expected_revision).await?;

    let reply = json!({"sync_revision": document.sync_revision});
    let broadcast = Broadcast::new(
        "document_updated",
        json!({
            "document_id": document.id,
            "patch": patch,
            "sync_revision": document.sync_revision,
            "content_hash": document.content_hash,
        }),
    );

    Ok((reply, Some(broadcast)))
}

/// `delete_document {document_id}`
async fn delete_document(state: &AppState, user_id: Uuid, payload: &Value) -> HandlerResult {
    let document_id = uuid_param(payload, "document_id").ok_or(SyncError::MissingParams)?;

    let document = documents::delete(&state.pool, user_id, document_id).await?;

    let reply = json!({});
    let broadcast = Broadcast::new(
        "document_deleted",
        json!({"document_id": document.id}),
    );

    Ok((reply, Some(broadcast)))
}

/// `request_full_sync {}`
async fn request_full_sync(state: &AppState, user_id: Uuid) -> HandlerResult {
    let documents = documents::list_non_deleted(&state.pool, user_id).await?;
    let latest_sequence = changes::latest_sequence(&state.pool, user_id).await?;

    let documents: Vec<Value> = documents
        .into_iter()
        .map(|document| {
            json!({
                "id": document.id,
                "content": document.content,
                "sync_revision": document.sync_revision,
                "content_hash": document.content_hash,
                "title": document.title,
                "created_at": document.created_at,
                "updated_at": document.updated_at,
            })
        })
        .collect();

    let reply = json!({
        "documents": documents,
        "latest_sequence": latest_sequence,
    });

    Ok((reply, None))
}

/// `get_changes_since {last_sequence}`
async fn get_changes_since(state: &AppState, user_id: Uuid, payload: &Value) -> HandlerResult {
    let last_sequence = int_param(payload, "last_sequence").ok_or(SyncError::MissingParams)?;

    let events = changes::events_since(
        &state.pool,
        user_id,
        last_sequence,
        changes::DEFAULT_CHANGES_LIMIT,
    )
    .await?;
    let latest_sequence = changes::latest_sequence(&state.pool, user_id).await?;

    let reply = json!({
        "events": events,
        "latest_sequence": latest_sequence,
    });

    Ok((reply, None))
}

/// `transform_operations {local_ops, remote_ops}`
fn transform_operations(payload: &Value) -> HandlerResult {
    let local_ops = payload["local_ops"]
        .as_array()
        .ok_or(SyncError::MissingParams)?;
    let remote_ops = payload["remote_ops"]
        .as_array()
        .ok_or(SyncError::MissingParams)?;

    let (transformed_local, transformed_remote) =
        transform::transform_lists(local_ops, remote_ops)?;

    let reply = json!({
        "transformed_local": transformed_local,
        "transformed_remote": transformed_remote,
    });

    Ok((reply, None))
}
