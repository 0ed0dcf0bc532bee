//! # Metrics Collection
//!
//! Counters for token issuance, revocation and configuration changes.
//! Without an installed recorder the macros are no-ops, so handlers record
//! unconditionally.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use ::tracing::info;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter when a metrics port is configured.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let Some(address) = config.metrics_bind_address() else {
        return Ok(());
    };

    let addr: SocketAddr = address
        .parse()
        .map_err(|e| Error::config(format!("Invalid metrics address '{}': {}", address, e)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus exporter: {}", e)))?;

    describe_metrics();
    info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("argocd_tokens_issued_total", "Argo CD project tokens minted");
    describe_counter!("argocd_tokens_revoked_total", "Argo CD project token revocations by outcome");
    describe_counter!("argocd_config_changes_total", "Admin configuration writes and deletes");
    describe_counter!("argocd_upstream_errors_total", "Failed control-plane calls by operation");
}

/// Record a minted token. Projects are not a label; they are unbounded.
pub fn record_token_issued() {
    counter!("argocd_tokens_issued_total").increment(1);
}

/// Record a revocation outcome (`revoked`, `already_revoked`, `failed`)
pub fn record_token_revoked(outcome: &'static str) {
    let labels = [("outcome", outcome)];
    counter!("argocd_tokens_revoked_total", &labels).increment(1);
}

/// Record an admin configuration change (`update`, `delete`)
pub fn record_config_change(operation: &'static str) {
    let labels = [("operation", operation)];
    counter!("argocd_config_changes_total", &labels).increment(1);
}

/// Record a failed control-plane call (`create_token`, `delete_token`)
pub fn record_upstream_error(operation: &'static str) {
    let labels = [("operation", operation)];
    counter!("argocd_upstream_errors_total", &labels).increment(1);
}
