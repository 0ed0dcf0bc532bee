//! Common test utilities for all integration tests.
//!
//! Provides a wiremock-based stand-in for the Argo CD project token API.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use serde_json::{json, Map, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ADMIN_TOKEN: &str = "admin-tok";
pub const PROJECT: &str = "team-a";
pub const ROLE: &str = "deploy-role";

/// Fake Argo CD server.
pub struct MockArgoCd {
    pub server: MockServer,
}

impl MockArgoCd {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Address to store as `serverAddress`.
    pub fn address(&self) -> String {
        self.server.uri()
    }

    pub fn token_path(project: &str, role: &str) -> String {
        format!("/api/v1/projects/{}/roles/{}/token", project, role)
    }

    /// Answer token creation with `minted-<id>`, requiring the admin bearer.
    pub async fn mount_create(&self, project: &str, role: &str) {
        Mock::given(method("POST"))
            .and(path(Self::token_path(project, role)))
            .and(header("authorization", format!("Bearer {}", ADMIN_TOKEN).as_str()))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
                let id = body["id"].as_str().unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(json!({ "token": format!("minted-{}", id) }))
            })
            .mount(&self.server)
            .await;
    }

    /// Reject token creation with an Argo CD style error body.
    pub async fn mount_create_error(&self, project: &str, role: &str, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(Self::token_path(project, role)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": message,
                "code": 7,
                "message": message
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer token deletion for `id` with `status`.
    pub async fn mount_delete(&self, project: &str, role: &str, id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("{}/0", Self::token_path(project, role))))
            .and(query_param("id", id))
            .and(header("authorization", format!("Bearer {}", ADMIN_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({})))
            .mount(&self.server)
            .await;
    }

    /// Answer the first deletion for `id` with `status`, then fall through.
    pub async fn mount_delete_once(&self, project: &str, role: &str, id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("{}/0", Self::token_path(project, role))))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": "unavailable" })))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn received_with_method(&self, verb: &str) -> Vec<Request> {
        self.received().await.into_iter().filter(|r| r.method.as_str() == verb).collect()
    }
}

/// Body of a `config/admin` update.
pub fn config_body(server_address: &str, auth_token: &str) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("serverAddress".to_string(), Value::String(server_address.to_string()));
    data.insert("authToken".to_string(), Value::String(auth_token.to_string()));
    data
}
