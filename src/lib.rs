//! # argocd-secrets
//!
//! A dynamic secrets backend that mints short-lived Argo CD project role
//! tokens on demand and deletes them when their lease is revoked.
//!
//! ## Architecture
//!
//! ```text
//! HTTP host adapter (api) → ArgoCdBackend (backend) → Argo CD REST API (argocd)
//!          ↓                        ↓
//!    LeaseRegistry          Storage (config/admin)
//! ```
//!
//! The backend is written against the host-framework boundary in
//! [`framework`]: any host that can hand it a [`framework::Request`] with a
//! [`framework::Storage`] can serve it. The bundled [`api`] module is a small
//! stand-alone host built on axum.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use argocd_secrets::backend::{ArgoCdBackend, CONFIG_PATH};
//! use argocd_secrets::config::UpstreamConfig;
//! use argocd_secrets::framework::{InMemoryStorage, LogicalBackend, Operation, Request};
//!
//! # async fn example() -> argocd_secrets::Result<()> {
//! let backend = ArgoCdBackend::new(&UpstreamConfig::default())?;
//! let storage = Arc::new(InMemoryStorage::new());
//!
//! let mut data = serde_json::Map::new();
//! data.insert("serverAddress".into(), "https://argocd.example.com".into());
//! data.insert("authToken".into(), "admin-token".into());
//! backend
//!     .handle_request(Request::new(Operation::Update, CONFIG_PATH, storage.clone()).with_data(data))
//!     .await?;
//!
//! let issued = backend
//!     .handle_request(
//!         Request::new(Operation::Read, "team-a/deploy-role", storage).with_client_token("s.caller"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod argocd;
pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod framework;
pub mod observability;

pub use backend::ArgoCdBackend;
pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
