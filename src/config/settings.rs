//! # Configuration Settings
//!
//! Process-level settings for the Argo CD secrets backend. These are
//! distinct from the admin configuration stored through the backend's
//! `config/admin` path: they describe how this process listens, logs and
//! talks TLS to the control plane, not which control plane it talks to.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

const ENV_PREFIX: &str = "ARGOCD_SECRETS_";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Host adapter HTTP listener
    #[validate(nested)]
    pub server: ServerConfig,

    /// Control-plane client settings
    #[validate(nested)]
    pub upstream: UpstreamConfig,

    /// Logging and metrics
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from `ARGOCD_SECRETS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.observability.metrics_port != 0 && self.observability.metrics_port == self.server.port
        {
            return Err(Error::validation("Server and metrics ports cannot be the same"));
        }

        // Interpolated into the router pattern, so `{`, `}` and `*` must never reach it
        if !self
            .server
            .mount_path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::validation_field(
                "Mount path may only contain ASCII letters, digits, '-' and '_'",
                "mount_path",
            ));
        }

        if self.server.mount_path == "sys" {
            return Err(Error::validation_field("Mount path 'sys' is reserved", "mount_path"));
        }

        Ok(())
    }
}

/// HTTP listener configuration for the stand-alone host adapter
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Mount point the backend is served under (`/v1/<mount_path>/...`)
    #[validate(length(min = 1, message = "Mount path cannot be empty"))]
    pub mount_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8200, mount_path: "argocd".to_string() }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_string("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT")?.unwrap_or(defaults.port),
            mount_path: env_string("MOUNT_PATH").unwrap_or(defaults.mount_path),
        })
    }
}

/// Transport settings for the control-plane client.
///
/// TLS verification is on unless `tls_skip_verify` is set explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpstreamConfig {
    /// Request timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Timeout must be between 1 and 300 seconds"
    ))]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Disable certificate verification toward the control plane
    pub tls_skip_verify: bool,

    /// Additional PEM CA bundle trusted for the control plane
    pub ca_cert_path: Option<PathBuf>,

    /// User-Agent sent on every control-plane request
    #[validate(length(min = 1, message = "User agent cannot be empty"))]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            tls_skip_verify: false,
            ca_cert_path: None,
            user_agent: format!("{}/{}", crate::APP_NAME, crate::VERSION),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            timeout_seconds: env_parse("UPSTREAM_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.timeout_seconds),
            connect_timeout_seconds: env_parse("UPSTREAM_CONNECT_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.connect_timeout_seconds),
            tls_skip_verify: env_bool("UPSTREAM_TLS_SKIP_VERIFY").unwrap_or(false),
            ca_cert_path: env_string("UPSTREAM_CA_CERT").map(PathBuf::from),
            user_agent: env_string("USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Prometheus exporter port (0 = disabled)
    pub metrics_port: u16,

    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            metrics_port: 0,
            service_name: crate::APP_NAME.to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            log_level: env_string("LOG_LEVEL")
                .or_else(|| std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty()))
                .unwrap_or(defaults.log_level),
            json_logging: env_bool("LOG_JSON").unwrap_or(false),
            metrics_port: env_parse("METRICS_PORT")?.unwrap_or(defaults.metrics_port),
            service_name: env_string("SERVICE_NAME").unwrap_or(defaults.service_name),
        })
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
    env_string(name).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|value| {
            value.parse::<T>().map_err(|e| {
                Error::config(format!("Invalid value for {}{}: {}", ENV_PREFIX, name, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch process environment
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.upstream.tls_skip_verify);
        assert!(config.upstream.user_agent.starts_with("argocd-secrets/"));
    }

    #[test]
    fn test_server_config_bind_address() {
        let config = ServerConfig { host: "0.0.0.0".to_string(), port: 8300, ..Default::default() };
        assert_eq!(config.bind_address(), "0.0.0.0:8300");
    }

    #[test]
    fn test_upstream_timeouts() {
        let config = UpstreamConfig {
            timeout_seconds: 45,
            connect_timeout_seconds: 5,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(45));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_metrics_address() {
        let config = ObservabilityConfig { metrics_port: 9090, ..Default::default() };
        assert_eq!(config.metrics_bind_address(), Some("0.0.0.0:9090".to_string()));
        assert_eq!(ObservabilityConfig::default().metrics_bind_address(), None);
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = AppConfig::default();
        config.observability.metrics_port = config.server.port;
        assert!(config.validate().is_err());

        for mount_path in ["a/b", "a{b", "team}", "*path", "argo cd", "sys"] {
            let mut config = AppConfig::default();
            config.server.mount_path = mount_path.to_string();
            assert!(
                matches!(config.validate(), Err(Error::Validation { .. })),
                "mount path {:?} should be rejected",
                mount_path
            );
        }

        let mut config = AppConfig::default();
        config.server.mount_path = "argo-cd_prod2".to_string();
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ARGOCD_SECRETS_PORT", "8300");
        std::env::set_var("ARGOCD_SECRETS_UPSTREAM_TLS_SKIP_VERIFY", "true");
        std::env::set_var("ARGOCD_SECRETS_UPSTREAM_CA_CERT", "/vault/secrets/ca.crt");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 8300);
        assert!(config.upstream.tls_skip_verify);
        assert_eq!(config.upstream.ca_cert_path, Some(PathBuf::from("/vault/secrets/ca.crt")));

        std::env::remove_var("ARGOCD_SECRETS_PORT");
        std::env::remove_var("ARGOCD_SECRETS_UPSTREAM_TLS_SKIP_VERIFY");
        std::env::remove_var("ARGOCD_SECRETS_UPSTREAM_CA_CERT");
    }

    #[test]
    fn test_from_env_invalid_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ARGOCD_SECRETS_PORT", "not-a-port");
        let result = AppConfig::from_env();
        std::env::remove_var("ARGOCD_SECRETS_PORT");
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
