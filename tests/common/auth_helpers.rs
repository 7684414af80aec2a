//! Authentication test helpers.

use relaypad::auth::credentials::{self, ApiCredential};
use relaypad::auth::signature::create_signature;
use serde_json::{json, Value};
use sqlx::PgPool;

/// Create a fresh credential in the database.
pub async fn create_test_credential(pool: &PgPool) -> ApiCredential {
    credentials::insert_credential(pool, "test credential")
        .await
        .expect("Failed to insert test credential")
}

/// Build a correctly signed join payload for a credential and email.
pub fn signed_join_payload(credential: &ApiCredential, email: &str) -> Value {
    let timestamp = chrono::Utc::now().timestamp();
    let signature = create_signature(&credential.secret, timestamp, email, &credential.api_key, "");
    json!({
        "email": email,
        "api_key": credential.api_key,
        "signature": signature,
        "timestamp": timestamp,
    })
}
