//! Persistent state: documents and their change log.
//!
//! All mutation goes through [`documents`]; each committed mutation leaves
//! exactly one event in the log read by [`changes`]. Nothing outside this
//! module writes those tables.

/// Transactional document CRUD
pub mod documents;

/// Change-log reads
pub mod changes;

pub use changes::ChangeEvent;
pub use documents::Document;
