//! # Structured Logging
//!
//! `tracing-subscriber` setup and span helpers. Token values never appear in
//! log fields; handlers log scope (`project`, `role`) and `token_id` only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for a backend request.
///
/// ```rust,ignore
/// let span = request_span!(Operation::Read, "team-a/deploy");
/// ```
#[macro_export]
macro_rules! request_span {
    ($operation:expr, $path:expr) => {
        tracing::info_span!(
            "backend_request",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "backend_request",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// The filter comes from `config.log_level`, which accepts either a plain
/// level or a full `EnvFilter` directive.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).map_err(|e| {
        Error::config(format!("Invalid log filter '{}': {}", config.log_level, e))
    })?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        mount_path = %config.server.mount_path,
        upstream_timeout_seconds = config.upstream.timeout_seconds,
        upstream_tls_skip_verify = config.upstream.tls_skip_verify,
        upstream_ca_cert = ?config.upstream.ca_cert_path,
        metrics_enabled = config.observability.metrics_port != 0,
        "Argo CD secrets backend configuration"
    );
}
