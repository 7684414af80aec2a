//! Server initialization.
//!
//! `create_app` wires configuration, the database pool, and shared state
//! into a ready router, and spawns the periodic reaper that drops topic
//! channels nobody subscribes to anymore.

use axum::Router;

use crate::routes::create_router;
use crate::server::config::{connect_database, ServerConfig};
use crate::server::state::AppState;

/// Interval between topic-registry cleanup passes.
const TOPIC_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Create and configure the axum application.
///
/// Fails only when the database is unreachable; everything else degrades
/// to log output.
pub async fn create_app() -> Result<Router, sqlx::Error> {
    tracing::info!("Initializing sync server");

    let config = ServerConfig::from_env();
    let pool = connect_database().await?;
    let state = AppState::new(pool, config);

    let registry = state.topics.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(TOPIC_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            registry.cleanup_inactive();
            tracing::debug!("[Channel] Reaped inactive topic channels");
        }
    });

    tracing::info!("Router configured with periodic topic cleanup task");

    Ok(create_router(state))
}
