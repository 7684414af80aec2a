//! Synchronization primitives: paths, transforms, patches.
//!
//! Everything in this module is pure (no shared state, no IO), which is
//! what lets two sessions transform concurrent edit streams without
//! coordination.
//!
//! # Module Structure
//!
//! ```text
//! sync/
//! ├── mod.rs       - Module exports
//! ├── path.rs      - JSON Pointer parsing and index arithmetic
//! ├── transform.rs - Operational transformation of concurrent patch ops
//! └── patch.rs     - RFC 6902 normalization, application, inversion
//! ```

/// JSON Pointer path engine
pub mod path;

/// Operational transformation of concurrent operations
pub mod transform;

/// Patch normalization and application
pub mod patch;

pub use path::{PathRelation, PathSegment, ParsedPath};
pub use transform::{transform_lists, transform_pair};
