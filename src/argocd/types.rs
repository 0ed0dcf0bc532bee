//! Wire types for the Argo CD project token API.

use serde::{Deserialize, Serialize};

use crate::domain::{SecretString, TokenId, TokenScope};

/// Body of `POST /api/v1/projects/{project}/roles/{role}/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTokenCreateRequest {
    pub project: String,
    pub role: String,
    pub description: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub id: TokenId,
}

impl ProjectTokenCreateRequest {
    pub fn new(
        scope: &TokenScope,
        id: TokenId,
        description: impl Into<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            project: scope.project.clone(),
            role: scope.role.clone(),
            description: description.into(),
            expires_in,
            id,
        }
    }
}

/// Parameters of `DELETE /api/v1/projects/{project}/roles/{role}/token/{iat}?id={id}`.
///
/// Tokens minted with an explicit id are deleted by id; `iat` is sent as `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTokenDeleteRequest {
    pub project: String,
    pub role: String,
    pub iat: i64,
    pub id: TokenId,
}

impl ProjectTokenDeleteRequest {
    pub fn by_id(scope: &TokenScope, id: TokenId) -> Self {
        Self { project: scope.project.clone(), role: scope.role.clone(), iat: 0, id }
    }
}

/// Response of a successful token creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectTokenResponse {
    pub token: SecretString,
}

/// Error body returned by the Argo CD API gateway.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArgoCdErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
