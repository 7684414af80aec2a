//! Server configuration and database startup.
//!
//! Configuration comes from environment variables, loaded once at startup.
//! Development defaults are logged loudly so a production deployment that
//! forgot to set a secret can be spotted in the logs.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::users;

/// Typed runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Acceptance window for signature timestamps, in seconds either side
    /// of server time.
    pub hmac_window_secs: i64,
    /// UUIDv5 namespace for user ids, derived from the application id
    /// string. Must match the clients' value or user ids will not line up.
    pub app_namespace: Uuid,
    /// Secret for signing session material at the boundary layer.
    pub session_secret: String,
}

impl ServerConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let hmac_window_secs = std::env::var("API_HMAC_WINDOW_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(300);

        let app_id = std::env::var("APP_NAMESPACE").unwrap_or_else(|_| {
            tracing::warn!("APP_NAMESPACE not set, defaulting to \"relaypad\"");
            "relaypad".to_string()
        });

        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set, using an insecure development default");
            "insecure-development-secret".to_string()
        });

        Self {
            hmac_window_secs,
            app_namespace: users::app_namespace(&app_id),
            session_secret,
        }
    }
}

/// Connect to PostgreSQL and bring the schema up to date.
///
/// `DATABASE_URL` is required. Migration failures are logged but do not
/// abort startup; they usually mean the schema is already in place.
pub async fn connect_database() -> Result<PgPool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL is not set".into()))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;
    tracing::info!("Database connection pool created");

    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {e}");
            tracing::warn!("Continuing without migrations - schema may already be current");
        }
    }

    Ok(pool)
}
