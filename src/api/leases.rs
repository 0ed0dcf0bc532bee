//! In-memory lease bookkeeping for the stand-alone host adapter.
//!
//! The registry only remembers what was issued. Revocation happens when a
//! caller asks for it (`sys/leases/revoke`) or for everything past expiry
//! (`sys/leases/tidy`); nothing is scheduled.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::framework::LeaseSecret;

/// A lease handed out by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseRecord {
    pub lease_id: String,
    /// Backend path the secret was issued from
    pub path: String,
    pub secret: LeaseSecret,
}

impl LeaseRecord {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.secret.expires_at()
    }
}

#[derive(Debug, Default)]
pub struct LeaseRegistry {
    leases: RwLock<HashMap<String, LeaseRecord>>,
}

impl LeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new lease and return its id (`{mount}/{path}/{uuid}`).
    pub async fn register(&self, mount: &str, path: &str, secret: LeaseSecret) -> String {
        let lease_id = format!("{}/{}/{}", mount, path, Uuid::new_v4());
        let record = LeaseRecord { lease_id: lease_id.clone(), path: path.to_string(), secret };
        self.leases.write().await.insert(lease_id.clone(), record);
        lease_id
    }

    pub async fn get(&self, lease_id: &str) -> Option<LeaseRecord> {
        self.leases.read().await.get(lease_id).cloned()
    }

    pub async fn remove(&self, lease_id: &str) -> Option<LeaseRecord> {
        self.leases.write().await.remove(lease_id)
    }

    /// Leases whose expiry is at or before `now`, oldest first.
    pub async fn expired_at(&self, now: DateTime<Utc>) -> Vec<LeaseRecord> {
        let mut expired: Vec<LeaseRecord> = self
            .leases
            .read()
            .await
            .values()
            .filter(|record| record.secret.is_expired_at(now))
            .cloned()
            .collect();
        expired.sort_by_key(|record| record.expires_at());
        expired
    }

    pub async fn len(&self) -> usize {
        self.leases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leases.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::time::Duration;

    fn secret(ttl_secs: u64, issued_at: DateTime<Utc>) -> LeaseSecret {
        LeaseSecret {
            secret_type: "argo_cd_token".to_string(),
            internal_data: Map::new(),
            ttl: Duration::from_secs(ttl_secs),
            renewable: false,
            issued_at,
        }
    }

    #[tokio::test]
    async fn test_register_get_remove() {
        let registry = LeaseRegistry::new();
        let lease_id = registry.register("argocd", "team-a/deploy", secret(3600, Utc::now())).await;

        assert!(lease_id.starts_with("argocd/team-a/deploy/"));
        let record = registry.get(&lease_id).await.unwrap();
        assert_eq!(record.path, "team-a/deploy");

        assert!(registry.remove(&lease_id).await.is_some());
        assert!(registry.get(&lease_id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_at() {
        let registry = LeaseRegistry::new();
        let now = Utc::now();
        let old = registry.register("argocd", "a/old", secret(60, now - chrono::Duration::hours(2))).await;
        let older =
            registry.register("argocd", "a/older", secret(60, now - chrono::Duration::hours(3))).await;
        registry.register("argocd", "a/fresh", secret(3600, now)).await;

        let expired = registry.expired_at(now).await;
        let ids: Vec<_> = expired.iter().map(|r| r.lease_id.clone()).collect();
        assert_eq!(ids, vec![older, old]);
        assert_eq!(registry.len().await, 3);
    }
}
