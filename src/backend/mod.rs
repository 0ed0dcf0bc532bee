//! # Argo CD secrets backend
//!
//! Mints short-lived Argo CD project role tokens on read and deletes them
//! when the host revokes the lease.
//!
//! ## Paths
//!
//! | Path | Operations | Purpose |
//! |---|---|---|
//! | `config/admin` | update, read, delete | Administrator credentials |
//! | `<project>/<role>` | read | Issue a token |
//!
//! The admin record is guarded by one read/write lock owned by the backend.
//! Control-plane calls never run while it is held.

pub mod client;
pub mod path_config;
pub mod path_creds;
pub mod secret_token;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::Instrument;

use crate::config::UpstreamConfig;
use crate::errors::{Error, Result};
use crate::framework::{
    LogicalBackend, Operation, PathPattern, PathSpec, Request, Response, SecretType, SpecialPaths,
};

pub use client::{ClientFactory, HttpClientFactory};
pub use path_config::{AdminConfig, CONFIG_PATH, CONFIG_STORAGE_KEY};
pub use secret_token::{SECRET_TOKEN_TYPE, TOKEN_DESCRIPTION, TOKEN_TTL};

/// Backend help text.
pub const BACKEND_HELP: &str = "The Argo CD backend is a secrets backend that vends Argo CD tokens.";

/// The assembled backend.
#[derive(Debug)]
pub struct ArgoCdBackend {
    config_lock: RwLock<()>,
    client_factory: Arc<dyn ClientFactory>,
    paths: Vec<PathSpec>,
    secret_types: Vec<SecretType>,
    special_paths: SpecialPaths,
}

impl ArgoCdBackend {
    /// Backend talking to Argo CD over HTTP with the given transport settings.
    ///
    /// Fails when the configured CA bundle cannot be loaded.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self> {
        Ok(Self::with_client_factory(Arc::new(HttpClientFactory::new(upstream)?)))
    }

    pub fn with_client_factory(client_factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            config_lock: RwLock::new(()),
            client_factory,
            // config/admin must precede the catch-all
            paths: vec![path_config::config_path_spec(), path_creds::creds_path_spec()],
            secret_types: vec![secret_token::token_secret_type()],
            special_paths: SpecialPaths { seal_wrap_storage: vec![CONFIG_STORAGE_KEY] },
        }
    }

    fn token_secret_type(&self) -> Result<&SecretType> {
        self.secret_types
            .iter()
            .find(|t| t.name == SECRET_TOKEN_TYPE)
            .ok_or_else(|| Error::internal(format!("secret type '{}' not registered", SECRET_TOKEN_TYPE)))
    }

    async fn route_path(&self, request: &Request) -> Result<Option<Response>> {
        let path = request.path.as_str();

        let Some(spec) = self.paths.iter().find(|spec| spec.pattern.matches(path).is_some()) else {
            return Err(Error::unknown_path(path));
        };

        if !spec.supports(request.operation) {
            return Err(Error::unsupported(request.operation, path));
        }

        match (&spec.pattern, request.operation) {
            (PathPattern::Exact { .. }, Operation::Update) => self.config_update(request).await,
            (PathPattern::Exact { .. }, Operation::Read) => self.config_read(request).await,
            (PathPattern::Exact { .. }, Operation::Delete) => self.config_delete(request).await,
            (PathPattern::MatchAll { .. }, Operation::Read) => self.issue_token(request, path).await,
            (_, operation) => Err(Error::unsupported(operation, path)),
        }
    }

    async fn route_secret(&self, request: &Request) -> Result<Option<Response>> {
        let secret = request
            .secret
            .as_ref()
            .ok_or_else(|| Error::validation("lease operation requires a secret"))?;

        let Some(secret_type) = self.secret_types.iter().find(|t| t.name == secret.secret_type) else {
            return Err(Error::unsupported(request.operation, &secret.secret_type));
        };

        match request.operation {
            Operation::Revoke => self.revoke_token(request).await,
            Operation::Renew if secret_type.renewable => {
                Err(Error::internal("renewable secret type without renew handler"))
            }
            operation => Err(Error::unsupported(operation, secret_type.name)),
        }
    }
}

#[async_trait]
impl LogicalBackend for ArgoCdBackend {
    async fn handle_request(&self, request: Request) -> Result<Option<Response>> {
        let span = crate::request_span!(request.operation, request.path);

        async {
            match request.operation {
                Operation::Revoke | Operation::Renew => self.route_secret(&request).await,
                _ => self.route_path(&request).await,
            }
        }
        .instrument(span)
        .await
    }

    fn paths(&self) -> &[PathSpec] {
        &self.paths
    }

    fn secret_types(&self) -> &[SecretType] {
        &self.secret_types
    }

    fn special_paths(&self) -> &SpecialPaths {
        &self.special_paths
    }

    fn help(&self) -> &str {
        BACKEND_HELP
    }
}
