//! # Configuration Management
//!
//! Process settings loaded from `ARGOCD_SECRETS_*` environment variables.

pub mod settings;

pub use settings::{AppConfig, ObservabilityConfig, ServerConfig, UpstreamConfig};
