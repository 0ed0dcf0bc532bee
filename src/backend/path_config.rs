//! `config/admin`: administrator credentials for the Argo CD instance.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use validator::Validate;

use super::ArgoCdBackend;
use crate::domain::{serialize_exposed, SecretString};
use crate::errors::{Error, Result};
use crate::framework::{
    FieldSchema, Operation, PathOperation, PathPattern, PathSpec, Request, Response, Storage,
    StorageEntry,
};
use crate::observability::metrics;

/// Route of the configuration path, relative to the mount.
pub const CONFIG_PATH: &str = "config/admin";

/// Storage key of the singleton admin record.
pub const CONFIG_STORAGE_KEY: &str = "config/admin";

/// Stored admin configuration.
///
/// `authToken` is persisted in clear so the backend can authenticate; it is
/// never placed in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    pub server_address: String,
    #[serde(serialize_with = "serialize_exposed")]
    pub auth_token: SecretString,
}

/// Fields accepted by an update on `config/admin`.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AdminConfigRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "authToken is required"))]
    auth_token: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "serverAddress is required"))]
    server_address: String,
}

pub(super) fn config_path_spec() -> PathSpec {
    PathSpec {
        pattern: PathPattern::Exact { path: CONFIG_PATH },
        fields: vec![
            FieldSchema::string("authToken", "Administrator token to access ArgoCD").required(),
            FieldSchema::string("serverAddress", "Address of the ArgoCD instance").required(),
        ],
        operations: vec![
            PathOperation {
                operation: Operation::Update,
                summary: "Configure the ArgoCD secrets backend.",
            },
            PathOperation {
                operation: Operation::Delete,
                summary: "Delete the ArgoCD secrets configuration.",
            },
            PathOperation {
                operation: Operation::Read,
                summary: "Examine the ArgoCD secrets configuration.",
            },
        ],
        help_synopsis: "Interact with the ArgoCD secrets configuration.",
    }
}

/// Read the admin record without taking the configuration lock.
pub(super) async fn load_config(storage: &dyn Storage) -> Result<Option<AdminConfig>> {
    match storage.get(CONFIG_STORAGE_KEY).await? {
        Some(entry) => Ok(Some(entry.decode_json()?)),
        None => Ok(None),
    }
}

impl ArgoCdBackend {
    /// Replace the admin record. Both fields are validated before anything
    /// is written, so a rejected update leaves the previous record intact.
    pub(super) async fn config_update(&self, request: &Request) -> Result<Option<Response>> {
        let input: AdminConfigRequest = request.decode_data()?;
        input.validate()?;

        let config = AdminConfig {
            server_address: input.server_address,
            auth_token: SecretString::from(input.auth_token),
        };
        let entry = StorageEntry::json(CONFIG_STORAGE_KEY, &config)?
            .sealed(self.special_paths.is_seal_wrapped(CONFIG_STORAGE_KEY));

        {
            let _guard = self.config_lock.write().await;
            request.storage.put(entry).await?;
        }

        metrics::record_config_change("update");
        info!(server_address = %config.server_address, "Argo CD admin configuration updated");
        Ok(None)
    }

    /// Remove the admin record; absent is fine.
    pub(super) async fn config_delete(&self, request: &Request) -> Result<Option<Response>> {
        {
            let _guard = self.config_lock.write().await;
            request.storage.delete(CONFIG_STORAGE_KEY).await?;
        }

        metrics::record_config_change("delete");
        info!("Argo CD admin configuration deleted");
        Ok(None)
    }

    /// Return `{serverAddress}`; the admin token is never included.
    pub(super) async fn config_read(&self, request: &Request) -> Result<Option<Response>> {
        let config = {
            let _guard = self.config_lock.read().await;
            load_config(request.storage.as_ref()).await?
        };

        let config = config.ok_or(Error::NotConfigured)?;

        let mut data = Map::new();
        data.insert("serverAddress".to_string(), Value::String(config.server_address));
        Ok(Some(Response::with_data(data)))
    }
}
