//! HMAC-SHA256 request signatures.
//!
//! Clients sign the literal message string
//! `"<unix_seconds>.<email>.<api_key>.<body>"` with their credential
//! secret and present the signature as lowercase hex. Verification checks
//! the timestamp window first, then looks up the credential, then compares
//! signatures in constant time. A signature of the wrong length fails
//! before any comparison work.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use sqlx::PgPool;

use crate::auth::credentials::{self, ApiCredential};
use crate::error::SyncError;

type HmacSha256 = Hmac<Sha256>;

/// Sign the canonical message string for the given request parameters.
///
/// Returns the lowercase-hex HMAC-SHA256 of
/// `"<timestamp>.<email>.<api_key>.<body>"` keyed by `secret`.
pub fn create_signature(
    secret: &str,
    timestamp: i64,
    email: &str,
    api_key: &str,
    body: &str,
) -> String {
    let message = format!("{timestamp}.{email}.{api_key}.{body}");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a presented signature against a freshly computed one.
///
/// The comparison is constant-time over equal lengths; a signature that is
/// not exactly 32 decoded bytes is rejected without comparing.
pub fn verify_signature(
    secret: &str,
    signature: &str,
    timestamp: i64,
    email: &str,
    api_key: &str,
    body: &str,
) -> bool {
    let Ok(presented) = hex::decode(signature) else {
        return false;
    };
    if presented.len() != 32 {
        return false;
    }

    let message = format!("{timestamp}.{email}.{api_key}.{body}");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac.verify_slice(&presented).is_ok()
}

/// Whether `timestamp` lies within `window_secs` of `now` (inclusive).
pub fn timestamp_in_window(now: i64, timestamp: i64, window_secs: i64) -> bool {
    (now - timestamp).abs() <= window_secs
}

/// Extract a signature timestamp from a wire value.
///
/// Accepts a JSON integer or a string holding one; anything else is
/// `invalid_timestamp`.
pub fn parse_timestamp(value: &Value) -> Result<i64, SyncError> {
    match value {
        Value::Number(number) => number.as_i64().ok_or(SyncError::InvalidTimestamp),
        Value::String(text) => text.parse().map_err(|_| SyncError::InvalidTimestamp),
        _ => Err(SyncError::InvalidTimestamp),
    }
}

/// Verify an HMAC-authenticated request against the credential store.
///
/// Checks, in order: the timestamp window, the existence of an active
/// credential for `api_key`, and the signature itself. On success the
/// credential's `last_used_at` is touched best-effort; a failure there
/// never fails the authentication.
pub async fn verify_hmac(
    pool: &PgPool,
    window_secs: i64,
    api_key: &str,
    signature: &str,
    timestamp: i64,
    email: &str,
    body: &str,
) -> Result<ApiCredential, SyncError> {
    let now = Utc::now().timestamp();
    if !timestamp_in_window(now, timestamp, window_secs) {
        return Err(SyncError::TimestampExpired);
    }

    let credential = credentials::find_active_by_api_key(pool, api_key)
        .await?
        .ok_or(SyncError::InvalidApiKey)?;

    if !verify_signature(&credential.secret, signature, timestamp, email, api_key, body) {
        return Err(SyncError::InvalidSignature);
    }

    credentials::touch_last_used(pool, credential.id).await;

    Ok(credential)
}
