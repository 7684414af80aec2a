//! API credential storage and generation.
//!
//! Credentials are key/secret pairs handed out ahead of time (the
//! generation CLI lives outside this repo; it calls [`insert_credential`]).
//! Keys look like `rpa_<64 hex>` and secrets like `rps_<64 hex>`, each
//! carrying 32 bytes from the OS random number generator.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Prefix of every API key.
pub const API_KEY_PREFIX: &str = "rpa_";
/// Prefix of every API secret.
pub const SECRET_PREFIX: &str = "rps_";

/// A persisted API credential.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiCredential {
    pub id: Uuid,
    pub api_key: String,
    pub secret: String,
    pub name: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Generate a fresh `(api_key, secret)` pair.
pub fn generate_credentials() -> (String, String) {
    (
        format!("{API_KEY_PREFIX}{}", random_hex()),
        format!("{SECRET_PREFIX}{}", random_hex()),
    )
}

fn random_hex() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Create and persist a new credential under the given display name.
pub async fn insert_credential(pool: &PgPool, name: &str) -> Result<ApiCredential, sqlx::Error> {
    let (api_key, secret) = generate_credentials();
    let credential = sqlx::query_as::<_, ApiCredential>(
        r#"
        INSERT INTO api_credentials (id, api_key, secret, name, is_active, created_at)
        VALUES ($1, $2, $3, $4, true, $5)
        RETURNING id, api_key, secret, name, last_used_at, is_active, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&api_key)
    .bind(&secret)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(credential)
}

/// Look up an active credential by its API key.
pub async fn find_active_by_api_key(
    pool: &PgPool,
    api_key: &str,
) -> Result<Option<ApiCredential>, sqlx::Error> {
    sqlx::query_as::<_, ApiCredential>(
        r#"
        SELECT id, api_key, secret, name, last_used_at, is_active, created_at
        FROM api_credentials
        WHERE api_key = $1 AND is_active = true
        "#,
    )
    .bind(api_key)
    .fetch_optional(pool)
    .await
}

/// Record that a credential was just used.
///
/// Best-effort: a failure is logged and swallowed, never surfaced to the
/// authentication path.
pub async fn touch_last_used(pool: &PgPool, credential_id: Uuid) {
    let result = sqlx::query("UPDATE api_credentials SET last_used_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(credential_id)
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("[Auth] Failed to touch last_used_at for {credential_id}: {e}");
    }
}

/// Deactivate a credential. Deactivated keys fail lookup during auth.
pub async fn deactivate(pool: &PgPool, credential_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE api_credentials SET is_active = false WHERE id = $1")
        .bind(credential_id)
        .execute(pool)
        .await?;
    Ok(())
}
