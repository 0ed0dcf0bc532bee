//! HTTP client for the Argo CD project token API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Certificate, Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::types::{
    ArgoCdErrorBody, ProjectTokenCreateRequest, ProjectTokenDeleteRequest, ProjectTokenResponse,
};
use crate::config::UpstreamConfig;
use crate::domain::SecretString;
use crate::errors::{Error, Result};

/// Operations the backend needs from the control plane.
#[async_trait]
pub trait ProjectTokenClient: Send + Sync + std::fmt::Debug {
    /// Mint a project role token.
    async fn create_token(
        &self,
        request: &ProjectTokenCreateRequest,
    ) -> Result<ProjectTokenResponse>;

    /// Delete a project role token.
    async fn delete_token(&self, request: &ProjectTokenDeleteRequest) -> Result<()>;
}

/// Transport settings shared by every client a backend builds.
///
/// The CA bundle is read and parsed once, here, rather than per client.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    upstream: UpstreamConfig,
    ca_certificate: Option<Certificate>,
}

impl ClientOptions {
    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self> {
        if upstream.tls_skip_verify {
            warn!("TLS certificate verification toward Argo CD is disabled");
        }

        let ca_certificate = match &upstream.ca_cert_path {
            Some(path) => Some(load_ca_bundle(path)?),
            None => None,
        };

        Ok(Self { upstream: upstream.clone(), ca_certificate })
    }
}

fn load_ca_bundle(path: &Path) -> Result<Certificate> {
    let pem = std::fs::read(path).map_err(|e| {
        Error::config_with_source(
            format!("Failed to read CA bundle '{}'", path.display()),
            Box::new(e),
        )
    })?;
    Certificate::from_pem(&pem).map_err(|e| {
        Error::config_with_source(format!("Invalid CA bundle '{}'", path.display()), Box::new(e))
    })
}

/// `reqwest`-backed client authenticated with the administrator token.
#[derive(Debug, Clone)]
pub struct ArgoCdClient {
    http: Client,
    base_url: Url,
    auth_token: SecretString,
}

impl ArgoCdClient {
    /// Build a client for `server_address`.
    ///
    /// An address without a scheme is treated as `https://`.
    pub fn new(
        server_address: &str,
        auth_token: SecretString,
        options: &ClientOptions,
    ) -> Result<Self> {
        let base_url = normalize_server_address(server_address)?;
        let upstream = &options.upstream;

        let mut builder = Client::builder()
            .timeout(upstream.timeout())
            .connect_timeout(upstream.connect_timeout())
            .user_agent(upstream.user_agent.clone());

        if upstream.tls_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(certificate) = &options.ca_certificate {
            builder = builder.add_root_certificate(certificate.clone());
        }

        let http = builder.build().map_err(|e| {
            Error::config_with_source("Failed to build Argo CD HTTP client", Box::new(e))
        })?;

        Ok(Self { http, base_url, auth_token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `api/v1/projects/{project}/roles/{role}/token[/{extra}]` with
    /// each segment percent-encoded.
    fn token_url(&self, project: &str, role: &str, extra: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::config(format!("Server address '{}' cannot be a base URL", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(["api", "v1", "projects", project, "roles", role, "token"]);
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ProjectTokenClient for ArgoCdClient {
    async fn create_token(
        &self,
        request: &ProjectTokenCreateRequest,
    ) -> Result<ProjectTokenResponse> {
        let url = self.token_url(&request.project, &request.role, None)?;
        debug!(project = %request.project, role = %request.role, token_id = %request.id, "POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Failed to create project token: {}", e)))?;

        let response = check_status(response, "create project token").await?;
        response
            .json::<ProjectTokenResponse>()
            .await
            .map_err(|e| Error::upstream(format!("Invalid create token response: {}", e)))
    }

    async fn delete_token(&self, request: &ProjectTokenDeleteRequest) -> Result<()> {
        let mut url =
            self.token_url(&request.project, &request.role, Some(&request.iat.to_string()))?;
        url.query_pairs_mut().append_pair("id", request.id.as_str());
        debug!(project = %request.project, role = %request.role, token_id = %request.id, "DELETE {}", url);

        let response = self
            .http
            .delete(url)
            .bearer_auth(self.auth_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Failed to delete project token: {}", e)))?;

        check_status(response, "delete project token").await?;
        Ok(())
    }
}

/// Parse the stored server address, defaulting the scheme to `https`.
pub fn normalize_server_address(address: &str) -> Result<Url> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(Error::config("Server address is empty"));
    }

    let candidate =
        if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{}", trimmed) };

    let url = Url::parse(&candidate).map_err(|e| {
        Error::config_with_source(format!("Invalid server address '{}'", address), Box::new(e))
    })?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::config(format!("Invalid server address '{}'", address)));
    }

    Ok(url)
}

async fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::upstream_status(
        format!("Failed to {} ({}): {}", action, status, error_message(status, &body)),
        status.as_u16(),
    ))
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ArgoCdErrorBody>(body) {
        Ok(ArgoCdErrorBody { message: Some(message), .. }) => message,
        Ok(ArgoCdErrorBody { error: Some(error), .. }) => error,
        _ if body.trim().is_empty() => {
            status.canonical_reason().unwrap_or("no response body").to_string()
        }
        _ => body.trim().to_string(),
    }
}
