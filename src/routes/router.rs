//! Router assembly.
//!
//! Two routes matter: `GET /health` for the reverse proxy's liveness probe
//! and `GET /sync` for the WebSocket upgrade. Everything else is a 404.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::channel::session::ws_handler;
use crate::server::state::AppState;

/// Build the router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync", get(ws_handler))
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .with_state(state)
}

/// `GET /health` - liveness probe for the front proxy.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
