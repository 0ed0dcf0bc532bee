//! Lease-backed secret types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::path::FieldSchema;
use super::request::Response;
use crate::errors::{Error, Result};

/// A secret type the backend registers with the host, together with its
/// default lease duration. The host invokes the backend's revocation
/// callback for leases of this type.
#[derive(Debug, Clone)]
pub struct SecretType {
    pub name: &'static str,
    pub default_duration: Duration,
    pub renewable: bool,
    pub fields: Vec<FieldSchema>,
}

impl SecretType {
    /// Package a response carrying a new lease of this type.
    pub fn response<D: Serialize, I: Serialize>(&self, data: &D, internal: &I) -> Result<Response> {
        let data = to_object(data, "secret data")?;
        let internal_data = to_object(internal, "secret internal data")?;

        Ok(Response {
            data,
            secret: Some(LeaseSecret {
                secret_type: self.name.to_string(),
                internal_data,
                ttl: self.default_duration,
                renewable: self.renewable,
                issued_at: Utc::now(),
            }),
        })
    }
}

/// The lease half of a response: tracked by the host, handed back on revoke.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseSecret {
    pub secret_type: String,
    pub internal_data: Map<String, Value>,
    pub ttl: Duration,
    pub renewable: bool,
    pub issued_at: DateTime<Utc>,
}

impl LeaseSecret {
    /// Instant after which the host considers the lease expired.
    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

fn to_object<T: Serialize>(value: &T, what: &str) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::internal(format!("{} must be a JSON object, got {}", what, other))),
        Err(e) => Err(Error::serialization(e, format!("Failed to encode {}", what))),
    }
}
