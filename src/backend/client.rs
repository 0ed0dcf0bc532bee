//! Builds control-plane clients from the stored admin configuration.

use std::sync::Arc;

use super::path_config::{load_config, AdminConfig};
use super::ArgoCdBackend;
use crate::argocd::{ArgoCdClient, ClientOptions, ProjectTokenClient};
use crate::config::UpstreamConfig;
use crate::errors::Result;
use crate::framework::Storage;

/// Turns an [`AdminConfig`] into an authenticated client.
pub trait ClientFactory: Send + Sync + std::fmt::Debug {
    /// Fails with [`crate::errors::Error::Configuration`] when the stored
    /// address or transport settings cannot produce a client.
    fn build(&self, config: &AdminConfig) -> Result<Arc<dyn ProjectTokenClient>>;
}

/// Factory producing [`ArgoCdClient`]s with shared transport settings.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    options: ClientOptions,
}

impl HttpClientFactory {
    /// Fails with [`crate::errors::Error::Configuration`] when the CA bundle
    /// cannot be loaded.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self> {
        Ok(Self { options: ClientOptions::from_config(upstream)? })
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: &AdminConfig) -> Result<Arc<dyn ProjectTokenClient>> {
        let client =
            ArgoCdClient::new(&config.server_address, config.auth_token.clone(), &self.options)?;
        Ok(Arc::new(client))
    }
}

impl ArgoCdBackend {
    /// Resolve a client for the current configuration.
    ///
    /// `Ok(None)` means the backend has not been configured. The shared lock
    /// covers the storage read only.
    pub async fn project_client(
        &self,
        storage: &dyn Storage,
    ) -> Result<Option<Arc<dyn ProjectTokenClient>>> {
        let config = {
            let _guard = self.config_lock.read().await;
            load_config(storage).await?
        };

        config.map(|config| self.client_factory.build(&config)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SecretString;
    use crate::errors::Error;

    #[test]
    fn test_http_factory_builds_client() {
        let factory = HttpClientFactory::default();
        let config = AdminConfig {
            server_address: "argocd.example.com".to_string(),
            auth_token: SecretString::new("admin-tok"),
        };
        assert!(factory.build(&config).is_ok());
    }

    #[test]
    fn test_http_factory_loads_ca_bundle_once() {
        let dir = tempfile::tempdir().unwrap();
        let upstream =
            UpstreamConfig { ca_cert_path: Some(dir.path().to_path_buf()), ..Default::default() };
        assert!(matches!(HttpClientFactory::new(&upstream), Err(Error::Configuration { .. })));

        let upstream = UpstreamConfig { tls_skip_verify: true, ..Default::default() };
        let factory = HttpClientFactory::new(&upstream).unwrap();
        let config = AdminConfig {
            server_address: "argocd.example.com".to_string(),
            auth_token: SecretString::new("admin-tok"),
        };
        assert!(factory.build(&config).is_ok());
        assert!(factory.build(&config).is_ok());
    }

    #[test]
    fn test_http_factory_rejects_bad_address() {
        let factory = HttpClientFactory::default();
        let config = AdminConfig {
            server_address: "https://".to_string(),
            auth_token: SecretString::new("admin-tok"),
        };
        assert!(matches!(factory.build(&config), Err(Error::Configuration { .. })));
    }
}
