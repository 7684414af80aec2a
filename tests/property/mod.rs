//! Property-based tests.
//!
//! Uses proptest to drive the pure core with generated inputs.

pub mod path_proptest;
pub mod signature_proptest;
pub mod transform_proptest;
