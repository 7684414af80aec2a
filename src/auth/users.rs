//! User directory.
//!
//! User identities are deterministic: the id is the UUIDv5 of the email
//! under an application namespace, which is itself the UUIDv5 of the
//! application id string under the DNS namespace. Two independent nodes
//! configured with the same application id derive identical user ids for
//! the same email, so replicas agree on ownership without coordination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Derive the application namespace from the configured application id.
pub fn app_namespace(app_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, app_id.as_bytes())
}

/// Derive the deterministic user id for an email.
pub fn user_id_for_email(namespace: &Uuid, email: &str) -> Uuid {
    Uuid::new_v5(namespace, email.as_bytes())
}

/// Fetch the user for an email, creating the row on first sight.
///
/// The insert is an upsert keyed on the derived id; a concurrent join with
/// the same email simply observes the existing row.
pub async fn get_or_create(
    pool: &PgPool,
    namespace: &Uuid,
    email: &str,
) -> Result<User, sqlx::Error> {
    let id = user_id_for_email(namespace, email);

    sqlx::query(
        r#"
        INSERT INTO users (id, email, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, last_seen_at, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Record that the user was just seen. Best-effort.
pub async fn touch_last_seen(pool: &PgPool, user_id: Uuid) {
    let result = sqlx::query("UPDATE users SET last_seen_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("[Auth] Failed to touch last_seen_at for {user_id}: {e}");
    }
}
