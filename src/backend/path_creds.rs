//! Catch-all `<project>/<role>` path that mints project tokens.

use serde::Serialize;
use tracing::{info, warn};

use super::secret_token::{TOKEN_DESCRIPTION, TOKEN_TTL};
use super::ArgoCdBackend;
use crate::argocd::ProjectTokenCreateRequest;
use crate::domain::{serialize_exposed, SecretString, TokenId, TokenLeaseData, TokenScope};
use crate::errors::{Error, Result};
use crate::framework::{
    FieldSchema, Operation, PathOperation, PathPattern, PathSpec, Request, Response,
};
use crate::observability::metrics;

/// Field capturing the whole credential path.
pub const CREDS_PATH_FIELD: &str = "path";

/// Public part of an issued token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedToken {
    #[serde(serialize_with = "serialize_exposed")]
    auth_token: SecretString,
}

pub(super) fn creds_path_spec() -> PathSpec {
    PathSpec {
        pattern: PathPattern::MatchAll { field: CREDS_PATH_FIELD },
        fields: vec![FieldSchema::string(CREDS_PATH_FIELD, "Specifies the path of the secret.")],
        operations: vec![PathOperation {
            operation: Operation::Read,
            summary: "Issue an Argo CD token for the project role.",
        }],
        help_synopsis: "Generate a project role token. The path has the form <project>/<role>.",
    }
}

impl ArgoCdBackend {
    /// Mint one token for the `(project, role)` encoded in `path`.
    ///
    /// Exactly one create call is made; nothing is retried and no lease is
    /// returned on failure.
    pub(super) async fn issue_token(&self, request: &Request, path: &str) -> Result<Option<Response>> {
        if request.client_token().is_none() {
            return Err(Error::unauthenticated("client token empty"));
        }

        let scope = TokenScope::parse(path)?;

        let client = self
            .project_client(request.storage.as_ref())
            .await?
            .ok_or(Error::NotConfigured)?;

        let id = TokenId::generate();
        let create = ProjectTokenCreateRequest::new(
            &scope,
            id.clone(),
            TOKEN_DESCRIPTION,
            TOKEN_TTL.as_secs() as i64,
        );

        let minted = client.create_token(&create).await.map_err(|e| {
            metrics::record_upstream_error("create_token");
            warn!(
                project = %scope.project,
                role = %scope.role,
                token_id = %id,
                error = %e,
                "Failed to mint Argo CD token"
            );
            e
        })?;

        let lease = TokenLeaseData::new(&scope, id, minted.token);
        let data = IssuedToken { auth_token: lease.auth_token.clone() };
        let response = self.token_secret_type()?.response(&data, &lease)?;

        metrics::record_token_issued();
        info!(
            project = %scope.project,
            role = %scope.role,
            token_id = %lease.id,
            "Issued Argo CD token"
        );

        Ok(Some(response))
    }
}
