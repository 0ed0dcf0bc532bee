//! # Argo CD control plane
//!
//! Client boundary for minting and deleting project role tokens.

pub mod client;
pub mod types;

pub use client::{normalize_server_address, ArgoCdClient, ClientOptions, ProjectTokenClient};
pub use types::{ProjectTokenCreateRequest, ProjectTokenDeleteRequest, ProjectTokenResponse};
