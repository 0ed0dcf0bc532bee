//! Requests routed into the backend and the responses it returns.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::secret::LeaseSecret;
use super::storage::Storage;
use crate::errors::{Error, Result};

/// Operation requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
    /// Lease revocation callback
    Revoke,
    /// Lease renewal callback
    Renew,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Revoke => "revoke",
            Self::Renew => "renew",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "list" => Ok(Self::List),
            "revoke" => Ok(Self::Revoke),
            "renew" => Ok(Self::Renew),
            _ => Err(format!("Unknown operation: {}", s)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A request dispatched by the host.
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: Operation,
    /// Path relative to the backend's mount point
    pub path: String,
    /// Caller identity; `None` when the caller presented no token
    pub client_token: Option<String>,
    /// Request body fields
    pub data: Map<String, Value>,
    pub storage: Arc<dyn Storage>,
    /// The lease being revoked or renewed
    pub secret: Option<LeaseSecret>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Self {
            operation,
            path: path.into(),
            client_token: None,
            data: Map::new(),
            storage,
            secret: None,
        }
    }

    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = Some(token.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_secret(mut self, secret: LeaseSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Caller token, treating an empty string as absent.
    pub fn client_token(&self) -> Option<&str> {
        self.client_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Decode the request body into a typed request struct.
    ///
    /// Missing fields and wrong JSON types surface as [`Error::Validation`].
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.data.clone()))
            .map_err(|e| Error::validation(format!("Invalid request body: {}", e)))
    }
}

/// Backend response. `secret` is set when the response creates a lease.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub data: Map<String, Value>,
    pub secret: Option<LeaseSecret>,
}

impl Response {
    /// Plain data response without a lease.
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::InMemoryStorage;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        name: String,
    }

    fn storage() -> Arc<dyn Storage> {
        Arc::new(InMemoryStorage::new())
    }

    #[test]
    fn test_operation_roundtrip() {
        for op in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::List,
            Operation::Revoke,
            Operation::Renew,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("patch".parse::<Operation>().is_err());
    }

    #[test]
    fn test_empty_client_token_is_absent() {
        let request = Request::new(Operation::Read, "a/b", storage()).with_client_token("");
        assert!(request.client_token().is_none());

        let request = Request::new(Operation::Read, "a/b", storage()).with_client_token("s.abc");
        assert_eq!(request.client_token(), Some("s.abc"));
    }

    #[test]
    fn test_decode_data() {
        let data = json!({ "name": "x" }).as_object().cloned().unwrap();
        let request = Request::new(Operation::Update, "p", storage()).with_data(data);
        assert_eq!(request.decode_data::<Body>().unwrap().name, "x");

        let data = json!({ "name": 5 }).as_object().cloned().unwrap();
        let request = Request::new(Operation::Update, "p", storage()).with_data(data);
        assert!(matches!(request.decode_data::<Body>(), Err(Error::Validation { .. })));
    }
}
