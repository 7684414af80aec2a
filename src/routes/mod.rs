//! HTTP route configuration.

/// Router assembly and the health endpoint
pub mod router;

pub use router::create_router;
