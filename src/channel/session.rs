//! WebSocket session handling.
//!
//! A session is one connected client. The connection itself is
//! unauthenticated; the first meaningful frame must be a `join` carrying
//! HMAC auth parameters and a `sync:<scope>` topic. Once joined, the
//! session loop multiplexes two sources: inbound frames from the client
//! and broadcasts from the session's topic. Broadcasts originated by this
//! session are dropped on receive so the sender only ever sees its direct
//! reply.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{signature, users};
use crate::channel::handlers;
use crate::channel::topics::TopicEvent;
use crate::error::SyncError;
use crate::server::state::AppState;
use crate::wire::envelope::str_param;
use crate::wire::{Reply, Request};

/// Topic prefix every join must use.
const TOPIC_PREFIX: &str = "sync:";

/// Who a session became after a successful join.
struct SessionIdentity {
    user_id: Uuid,
    email: String,
    topic: String,
}

/// `GET /sync` - upgrade to a sync session.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let mut identity: Option<SessionIdentity> = None;
    let mut topic_rx: Option<broadcast::Receiver<TopicEvent>> = None;

    tracing::info!("[Channel] Session {session_id} connected");

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let request: Request = match serde_json::from_str(&text) {
                            Ok(request) => request,
                            Err(e) => {
                                tracing::warn!("[Channel] Session {session_id} sent an unparseable frame: {e}");
                                continue;
                            }
                        };

                        let reply = if request.event == "join" {
                            match handle_join(&state, session_id, &request).await {
                                Ok((joined, reply)) => {
                                    topic_rx = Some(state.topics.subscribe(&joined.topic));
                                    identity = Some(joined);
                                    reply
                                }
                                Err(reply) => reply,
                            }
                        } else if let Some(ref who) = identity {
                            match handlers::dispatch(&state, who.user_id, &request.event, &request.payload).await {
                                Ok((payload, broadcast)) => {
                                    if let Some(broadcast) = broadcast {
                                        let reached = state.topics.publish(&who.topic, session_id, broadcast);
                                        tracing::debug!(
                                            "[Channel] Session {session_id} broadcast {} to {reached} subscribers",
                                            request.event
                                        );
                                    }
                                    Reply::ok(request.reference, payload)
                                }
                                Err(error) => Reply::from_error(request.reference, &error),
                            }
                        } else {
                            Reply::error(
                                request.reference,
                                json!({
                                    "reason": "join_required",
                                    "message": "join a sync topic before sending operations",
                                }),
                            )
                        };

                        if send_reply(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("[Channel] Session {session_id} socket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }

            event = recv_broadcast(&mut topic_rx) => {
                match event {
                    Ok((origin, broadcast)) => {
                        // Skip our own fan-out; the direct reply covers us.
                        if origin == session_id {
                            continue;
                        }
                        match serde_json::to_string(&broadcast) {
                            Ok(frame) => {
                                if sink.send(Message::Text(frame.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!("[Channel] Failed to serialize broadcast: {e}");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped broadcasts are recoverable through
                        // get_changes_since; keep the session alive.
                        tracing::warn!("[Channel] Session {session_id} lagged, skipped {skipped} broadcasts");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    if let Some(who) = identity {
        tracing::info!(
            "[Channel] Session {session_id} ({}) disconnected from {}",
            who.email,
            who.topic
        );
    } else {
        tracing::info!("[Channel] Session {session_id} disconnected before joining");
    }
}

/// Authenticate a join request.
///
/// All four parameters are required; a missing one is `missing_params`
/// before any verification runs. On success the user row is created or
/// fetched by its deterministic id and the reply carries it.
async fn handle_join(
    state: &AppState,
    session_id: Uuid,
    request: &Request,
) -> Result<(SessionIdentity, Reply), Reply> {
    let reference = request.reference.clone();

    let topic = match request.topic.as_deref() {
        Some(topic) if topic.starts_with(TOPIC_PREFIX) => topic.to_string(),
        _ => {
            return Err(Reply::error(
                reference,
                json!({
                    "reason": "invalid_topic",
                    "message": format!("join topic must start with \"{TOPIC_PREFIX}\""),
                }),
            ));
        }
    };

    let payload = &request.payload;
    let (Some(email), Some(api_key), Some(presented)) = (
        str_param(payload, "email"),
        str_param(payload, "api_key"),
        str_param(payload, "signature"),
    ) else {
        return Err(Reply::from_error(reference, &SyncError::MissingParams));
    };
    if payload["timestamp"].is_null() {
        return Err(Reply::from_error(reference, &SyncError::MissingParams));
    }

    let timestamp = signature::parse_timestamp(&payload["timestamp"])
        .map_err(|e| Reply::from_error(reference.clone(), &e))?;
    let body = str_param(payload, "body").unwrap_or_default();

    signature::verify_hmac(
        &state.pool,
        state.config.hmac_window_secs,
        &api_key,
        &presented,
        timestamp,
        &email,
        &body,
    )
    .await
    .map_err(|e| Reply::from_error(reference.clone(), &e))?;

    let user = users::get_or_create(&state.pool, &state.config.app_namespace, &email)
        .await
        .map_err(|e| Reply::from_error(reference.clone(), &SyncError::from(e)))?;
    users::touch_last_seen(&state.pool, user.id).await;

    tracing::info!("[Channel] Session {session_id} joined {topic} as {email}");

    let reply = Reply::ok(reference, json!({"user_id": user.id}));
    let identity = SessionIdentity {
        user_id: user.id,
        email,
        topic,
    };

    Ok((identity, reply))
}

async fn recv_broadcast(
    rx: &mut Option<broadcast::Receiver<TopicEvent>>,
) -> Result<TopicEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        // Not joined yet - wait forever, the other select arm drives us.
        None => std::future::pending().await,
    }
}

async fn send_reply(
    sink: &mut SplitSink<WebSocket, Message>,
    reply: &Reply,
) -> Result<(), axum::Error> {
    let frame = serde_json::to_string(reply).map_err(axum::Error::new)?;
    sink.send(Message::Text(frame.into())).await
}
