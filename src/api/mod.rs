//! # HTTP host adapter
//!
//! Serves the backend under `/v1/{mount}/...`, keeps track of issued leases
//! and exposes on-demand revocation under `/v1/sys/leases/...`.

pub mod error;
pub mod handlers;
pub mod leases;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use leases::{LeaseRecord, LeaseRegistry};
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
