//! Domain layer
//!
//! Pure domain types with no host or network dependencies.
//!
//! ## Module Organization
//!
//! - `secret_string`: redacting wrapper for credentials
//! - `token`: `(project, role)` scope parsing, token identifiers and lease metadata

pub mod secret_string;
pub mod token;

pub use secret_string::{serialize_exposed, SecretString};
pub use token::{RevocationTarget, TokenId, TokenLeaseData, TokenScope};
