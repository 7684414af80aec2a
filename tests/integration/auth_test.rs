//! Authentication integration tests.
//!
//! These exercise the full HMAC verification path against a live database:
//! credential lookup ordering, window boundaries, and the deterministic
//! user directory.

use chrono::Utc;
use relaypad::auth::credentials;
use relaypad::auth::signature::{create_signature, verify_hmac};
use relaypad::auth::users;

use crate::common::auth_helpers::{create_test_credential, signed_join_payload};
use crate::common::database::{create_test_pool, unique_email};

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_verify_hmac_accepts_signed_request() {
    let pool = create_test_pool().await;
    let credential = create_test_credential(&pool).await;
    let email = unique_email("auth");

    let payload = signed_join_payload(&credential, &email);
    let verified = verify_hmac(
        &pool,
        300,
        payload["api_key"].as_str().unwrap(),
        payload["signature"].as_str().unwrap(),
        payload["timestamp"].as_i64().unwrap(),
        &email,
        "",
    )
    .await
    .unwrap();

    assert_eq!(verified.id, credential.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_verify_hmac_touches_last_used() {
    let pool = create_test_pool().await;
    let credential = create_test_credential(&pool).await;
    assert!(credential.last_used_at.is_none());

    let email = unique_email("auth");
    let payload = signed_join_payload(&credential, &email);
    verify_hmac(
        &pool,
        300,
        &credential.api_key,
        payload["signature"].as_str().unwrap(),
        payload["timestamp"].as_i64().unwrap(),
        &email,
        "",
    )
    .await
    .unwrap();

    let refreshed = credentials::find_active_by_api_key(&pool, &credential.api_key)
        .await
        .unwrap()
        .unwrap();
    assert!(refreshed.last_used_at.is_some());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_unknown_api_key_is_denied_before_signature_check() {
    let pool = create_test_pool().await;
    let timestamp = Utc::now().timestamp();

    // Even a garbage signature reports the key, not the signature.
    let err = verify_hmac(
        &pool,
        300,
        "rpa_0000000000000000000000000000000000000000000000000000000000000000",
        "not-even-hex",
        timestamp,
        "nobody@example.com",
        "",
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "invalid_api_key");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_wrong_signature_is_denied() {
    let pool = create_test_pool().await;
    let credential = create_test_credential(&pool).await;
    let email = unique_email("auth");
    let timestamp = Utc::now().timestamp();

    // Signed with the wrong secret.
    let forged = create_signature("rps_wrong", timestamp, &email, &credential.api_key, "");
    let err = verify_hmac(&pool, 300, &credential.api_key, &forged, timestamp, &email, "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_signature");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_expired_timestamp_is_denied() {
    let pool = create_test_pool().await;
    let credential = create_test_credential(&pool).await;
    let email = unique_email("auth");
    let timestamp = Utc::now().timestamp() - 301;

    let signature = create_signature(&credential.secret, timestamp, &email, &credential.api_key, "");
    let err = verify_hmac(&pool, 300, &credential.api_key, &signature, timestamp, &email, "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "timestamp_expired");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_deactivated_credential_is_denied() {
    let pool = create_test_pool().await;
    let credential = create_test_credential(&pool).await;
    credentials::deactivate(&pool, credential.id).await.unwrap();

    let email = unique_email("auth");
    let payload = signed_join_payload(&credential, &email);
    let err = verify_hmac(
        &pool,
        300,
        &credential.api_key,
        payload["signature"].as_str().unwrap(),
        payload["timestamp"].as_i64().unwrap(),
        &email,
        "",
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "invalid_api_key");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_get_or_create_is_idempotent_per_email() {
    let pool = create_test_pool().await;
    let namespace = users::app_namespace("relaypad");
    let email = unique_email("directory");

    let first = users::get_or_create(&pool, &namespace, &email).await.unwrap();
    let second = users::get_or_create(&pool, &namespace, &email).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.id, users::user_id_for_email(&namespace, &email));
    assert_eq!(first.created_at, second.created_at);
}
