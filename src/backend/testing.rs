//! Recording doubles for backend unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::client::ClientFactory;
use super::path_config::AdminConfig;
use crate::argocd::{
    ProjectTokenClient, ProjectTokenCreateRequest, ProjectTokenDeleteRequest, ProjectTokenResponse,
};
use crate::domain::SecretString;
use crate::errors::{Error, Result};

/// Records every call; mints `minted-<id>` unless told to fail.
#[derive(Debug, Default)]
pub(crate) struct RecordingClient {
    created: Mutex<Vec<ProjectTokenCreateRequest>>,
    deleted: Mutex<Vec<ProjectTokenDeleteRequest>>,
    create_status: Mutex<Option<u16>>,
    delete_status: Mutex<Option<u16>>,
}

impl RecordingClient {
    pub(crate) fn created(&self) -> Vec<ProjectTokenCreateRequest> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<ProjectTokenDeleteRequest> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn fail_create_with(&self, status: u16) {
        *self.create_status.lock().unwrap() = Some(status);
    }

    pub(crate) fn fail_delete_with(&self, status: u16) {
        *self.delete_status.lock().unwrap() = Some(status);
    }
}

#[async_trait]
impl ProjectTokenClient for RecordingClient {
    async fn create_token(
        &self,
        request: &ProjectTokenCreateRequest,
    ) -> Result<ProjectTokenResponse> {
        self.created.lock().unwrap().push(request.clone());
        if let Some(status) = *self.create_status.lock().unwrap() {
            return Err(Error::upstream_status("create rejected", status));
        }
        Ok(ProjectTokenResponse { token: SecretString::new(format!("minted-{}", request.id)) })
    }

    async fn delete_token(&self, request: &ProjectTokenDeleteRequest) -> Result<()> {
        self.deleted.lock().unwrap().push(request.clone());
        match *self.delete_status.lock().unwrap() {
            Some(status) => Err(Error::upstream_status("delete rejected", status)),
            None => Ok(()),
        }
    }
}

/// Hands out one shared [`RecordingClient`] and remembers which
/// `(serverAddress, authToken)` pairs it was built from.
#[derive(Debug, Default)]
pub(crate) struct RecordingFactory {
    pub(crate) client: Arc<RecordingClient>,
    built_for: Mutex<Vec<(String, String)>>,
}

impl RecordingFactory {
    pub(crate) fn built_for(&self) -> Vec<(String, String)> {
        self.built_for.lock().unwrap().clone()
    }
}

impl ClientFactory for RecordingFactory {
    fn build(&self, config: &AdminConfig) -> Result<Arc<dyn ProjectTokenClient>> {
        self.built_for.lock().unwrap().push((
            config.server_address.clone(),
            config.auth_token.expose_secret().to_string(),
        ));
        let client: Arc<dyn ProjectTokenClient> = self.client.clone();
        Ok(client)
    }
}

pub(crate) fn config_data(server_address: &str, auth_token: &str) -> Map<String, Value> {
    match json!({ "serverAddress": server_address, "authToken": auth_token }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
