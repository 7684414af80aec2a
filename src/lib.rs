//! RelayPad - multi-tenant JSON document synchronization server.
//!
//! Clients hold local replicas of JSON documents and reconcile with this
//! server over a persistent WebSocket channel. The server owns canonical
//! state, orders concurrent edits, broadcasts committed changes to the
//! other sessions on the same topic, and keeps a per-user change log for
//! full and incremental recovery.
//!
//! # Module Structure
//!
//! - **`sync`** - the pure core: JSON Pointer paths, operational
//!   transformation of concurrent patch operations, RFC 6902 application
//!   and inversion
//! - **`store`** - transactional document CRUD; every mutation commits the
//!   document row and one change-log event atomically
//! - **`auth`** - API credentials, HMAC-SHA256 request signatures, and the
//!   deterministic (UUIDv5) user directory
//! - **`channel`** - WebSocket sessions, message dispatch, topic-scoped
//!   broadcast fan-out
//! - **`wire`** - request/reply/broadcast envelopes
//! - **`server`** - configuration, shared state, application assembly
//! - **`routes`** - the HTTP surface: health probe and WebSocket upgrade
//! - **`error`** - the error taxonomy and its wire representation
//!
//! # Concurrency
//!
//! Sessions are independent tokio tasks. Document writes rely on
//! optimistic concurrency: an update must name the revision it was based
//! on, and the store re-checks that revision inside the committing
//! transaction. Fan-out uses `tokio::sync::broadcast` per topic and never
//! blocks a writer; a lagging subscriber catches up through the change
//! log, which is totally ordered per user.

/// Authentication and the user directory
pub mod auth;

/// Sessions, dispatch, and fan-out
pub mod channel;

/// Error taxonomy
pub mod error;

/// HTTP routes
pub mod routes;

/// Server configuration and assembly
pub mod server;

/// Documents and the change log
pub mod store;

/// Paths, transforms, patches
pub mod sync;

/// Wire envelopes
pub mod wire;

pub use error::SyncError;
pub use server::create_app;
