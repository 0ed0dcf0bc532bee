//! Host framework boundary.
//!
//! The secrets-management host supplies storage, path routing and lease
//! tracking. This module is the contract between the host and a backend:
//!
//! - [`Storage`]: durable key/value storage owned by the host
//! - [`Request`] / [`Response`]: what the host routes in and gets back
//! - [`PathSpec`]: the paths and operations a backend registers
//! - [`SecretType`] / [`LeaseSecret`]: lease-backed secrets and their revocation data
//! - [`LogicalBackend`]: the trait a backend implements

pub mod path;
pub mod request;
pub mod secret;
pub mod storage;

pub use path::{FieldKind, FieldSchema, PathOperation, PathPattern, PathSpec, SpecialPaths};
pub use request::{Operation, Request, Response};
pub use secret::{LeaseSecret, SecretType};
pub use storage::{InMemoryStorage, Storage, StorageEntry};

use async_trait::async_trait;

use crate::errors::Result;

/// Contract between the host and a secrets backend.
///
/// `handle_request` receives both routed path operations and lease
/// callbacks (`Operation::Revoke`, `Operation::Renew`, with
/// [`Request::secret`] populated). `Ok(None)` means success with no body.
#[async_trait]
pub trait LogicalBackend: Send + Sync {
    async fn handle_request(&self, request: Request) -> Result<Option<Response>>;

    /// Registered paths, in match order
    fn paths(&self) -> &[PathSpec];

    /// Registered lease-backed secret types
    fn secret_types(&self) -> &[SecretType];

    fn special_paths(&self) -> &SpecialPaths;

    fn help(&self) -> &str;
}
