//! HTTP surface tests.
//!
//! The health probe and the 404 fallback never touch the database, so
//! these run against a lazily created pool that never connects.

use axum_test::TestServer;
use relaypad::routes::create_router;
use relaypad::server::{AppState, ServerConfig};

fn test_server() -> TestServer {
    let pool = sqlx::PgPool::connect_lazy("postgres://localhost:5432/relaypad_unused")
        .expect("Failed to build lazy pool");
    let state = AppState::new(pool, ServerConfig::from_env());
    TestServer::new(create_router(state)).expect("Failed to start test server")
}

#[tokio::test]
async fn test_health_reports_ok() {
    let server = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = test_server();

    let response = server.get("/nope").await;

    response.assert_status_not_found();
}
