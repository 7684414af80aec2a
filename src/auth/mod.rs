//! Authentication: credentials, signatures, and the user directory.
//!
//! Sessions authenticate at join time with an HMAC-signed parameter set;
//! there are no passwords and no cookies. The pieces:
//!
//! - **`credentials`** - persisted API key/secret pairs
//! - **`signature`** - HMAC-SHA256 signing and verification
//! - **`users`** - deterministic email → UUIDv5 user directory

/// API credential storage and generation
pub mod credentials;

/// HMAC request signatures
pub mod signature;

/// User directory
pub mod users;

pub use credentials::ApiCredential;
pub use users::User;
