//! The `argo_cd_token` secret type and its revocation callback.

use std::time::Duration;

use tracing::{info, warn};

use super::ArgoCdBackend;
use crate::argocd::ProjectTokenDeleteRequest;
use crate::domain::RevocationTarget;
use crate::errors::{Error, Result};
use crate::framework::{FieldSchema, Request, Response, SecretType};
use crate::observability::metrics;

/// Lease type name of minted tokens.
pub const SECRET_TOKEN_TYPE: &str = "argo_cd_token";

/// Lifetime requested from Argo CD and declared on the lease.
pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Description attached to every minted token.
pub const TOKEN_DESCRIPTION: &str = "Dynamically generated vault secret";

pub(super) fn token_secret_type() -> SecretType {
    SecretType {
        name: SECRET_TOKEN_TYPE,
        default_duration: TOKEN_TTL,
        renewable: false,
        fields: vec![
            FieldSchema::string("authToken", "ArgoCD Token"),
            FieldSchema::string("id", "ArgoCD Token Id"),
            FieldSchema::string("role", "ArgoCD Token Role"),
            FieldSchema::string("project", "ArgoCD Token Project"),
        ],
    }
}

impl ArgoCdBackend {
    /// Delete the token described by the lease's internal data.
    ///
    /// A 404 from Argo CD means the token is already gone and counts as
    /// success. `NotConfigured` is returned as an error the host may retry.
    pub(super) async fn revoke_token(&self, request: &Request) -> Result<Option<Response>> {
        let secret = request
            .secret
            .as_ref()
            .ok_or_else(|| Error::internal("revocation request carries no lease"))?;
        let target = RevocationTarget::from_internal_data(&secret.internal_data)?;

        let client = self
            .project_client(request.storage.as_ref())
            .await?
            .ok_or(Error::NotConfigured)?;

        let delete = ProjectTokenDeleteRequest::by_id(&target.scope(), target.id.clone());
        match client.delete_token(&delete).await {
            Ok(()) => {
                metrics::record_token_revoked("revoked");
                info!(
                    project = %target.project,
                    role = %target.role,
                    token_id = %target.id,
                    "Revoked Argo CD token"
                );
                Ok(None)
            }
            Err(e) if e.upstream_status_code() == Some(404) => {
                metrics::record_token_revoked("already_revoked");
                warn!(
                    project = %target.project,
                    role = %target.role,
                    token_id = %target.id,
                    "Argo CD token not found, treating as already revoked"
                );
                Ok(None)
            }
            Err(e) => {
                metrics::record_token_revoked("failed");
                metrics::record_upstream_error("delete_token");
                warn!(
                    project = %target.project,
                    role = %target.role,
                    token_id = %target.id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to revoke Argo CD token"
                );
                Err(e)
            }
        }
    }
}
