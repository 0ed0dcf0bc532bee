use std::sync::Arc;

use axum::{
    routing::{any, get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::framework::{LogicalBackend, Storage};

use super::handlers::{
    backend_handler, health_handler, renew_lease_handler, revoke_lease_handler,
    tidy_leases_handler,
};
use super::leases::LeaseRegistry;

#[derive(Clone)]
pub struct ApiState {
    pub backend: Arc<dyn LogicalBackend>,
    pub storage: Arc<dyn Storage>,
    pub leases: Arc<LeaseRegistry>,
    /// Mount point the backend is served under
    pub mount: String,
}

impl ApiState {
    pub fn new(
        backend: Arc<dyn LogicalBackend>,
        storage: Arc<dyn Storage>,
        mount: impl Into<String>,
    ) -> Self {
        Self { backend, storage, leases: Arc::new(LeaseRegistry::new()), mount: mount.into() }
    }
}

pub fn build_router(state: ApiState) -> Router {
    let backend_route = format!("/v1/{}/{{*path}}", state.mount);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/sys/leases/revoke", put(revoke_lease_handler).post(revoke_lease_handler))
        .route("/v1/sys/leases/renew", put(renew_lease_handler).post(renew_lease_handler))
        .route("/v1/sys/leases/tidy", put(tidy_leases_handler).post(tidy_leases_handler))
        .route(&backend_route, any(backend_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
