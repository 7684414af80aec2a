//! Integration tests.
//!
//! `api_test` runs against an in-process router with a lazy pool and needs
//! nothing external. The store and auth suites talk to a live PostgreSQL
//! and are `#[ignore]`d by default.

pub mod api_test;
pub mod auth_test;
