//! Application state.
//!
//! One `AppState` is shared by every session and route handler. All fields
//! are cheap to clone: the pool and the topic registry are handles to
//! shared structures.

use sqlx::PgPool;

use crate::channel::topics::TopicRegistry;
use crate::server::config::ServerConfig;

/// Shared server state handed to axum.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// Topic registry for broadcast fan-out between sessions.
    pub topics: TopicRegistry,
    /// Runtime configuration.
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        Self {
            pool,
            topics: TopicRegistry::new(),
            config,
        }
    }
}
