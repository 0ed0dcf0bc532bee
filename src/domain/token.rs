//! Token scope parsing and lease metadata for minted Argo CD tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::secret_string::{serialize_exposed, SecretString};
use crate::errors::{Error, Result};

/// The `(project, role)` pair a token is minted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenScope {
    pub project: String,
    pub role: String,
}

impl TokenScope {
    /// Build a scope from its two components.
    pub fn new(project: impl Into<String>, role: impl Into<String>) -> Self {
        Self { project: project.into(), role: role.into() }
    }

    /// Parse a credential path of the form `<project>/<role>`.
    ///
    /// Exactly two non-empty segments are accepted; anything else is
    /// [`Error::MalformedPath`].
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(project), Some(role), None) if !project.is_empty() && !role.is_empty() => {
                Ok(Self::new(project, role))
            }
            _ => Err(Error::malformed_path(path)),
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.role)
    }
}

/// Identifier handed to the control plane at mint time and used again to delete the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal lease metadata recorded for every issued token.
///
/// Serialized field names match the lease's internal data keys:
/// `authToken`, `role`, `project`, `id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLeaseData {
    #[serde(serialize_with = "serialize_exposed")]
    pub auth_token: SecretString,
    pub role: String,
    pub project: String,
    pub id: TokenId,
}

impl TokenLeaseData {
    pub fn new(scope: &TokenScope, id: TokenId, auth_token: SecretString) -> Self {
        Self { auth_token, role: scope.role.clone(), project: scope.project.clone(), id }
    }
}

/// The part of the lease metadata needed to reverse an issuance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RevocationTarget {
    pub project: String,
    pub role: String,
    pub id: TokenId,
}

impl RevocationTarget {
    /// Extract the target from lease internal data.
    ///
    /// A missing or non-string field means the lease record is corrupt,
    /// which is reported as [`Error::Internal`].
    pub fn from_internal_data(data: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let field = |name: &str| -> Result<String> {
            data.get(name).and_then(|v| v.as_str()).map(str::to_string).ok_or_else(|| {
                Error::internal(format!("lease internal data is missing string field '{}'", name))
            })
        };

        Ok(Self { project: field("project")?, role: field("role")?, id: field("id")?.into() })
    }

    pub fn scope(&self) -> TokenScope {
        TokenScope::new(self.project.clone(), self.role.clone())
    }
}
