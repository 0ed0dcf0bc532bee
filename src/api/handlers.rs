use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::framework::{Operation, Request, Response};

use super::error::ApiError;
use super::routes::ApiState;

/// Header carrying the caller's identity.
pub const CLIENT_TOKEN_HEADER: &str = "x-vault-token";

/// Envelope returned for every backend response with a body.
#[derive(Debug, Serialize)]
pub struct SecretResponse {
    pub request_id: String,
    pub lease_id: String,
    pub lease_duration: u64,
    pub renewable: bool,
    pub data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LeaseRequestBody {
    pub lease_id: String,
}

#[derive(Debug, Serialize)]
pub struct TidyResponse {
    pub revoked: Vec<String>,
    pub failed: Vec<String>,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `/v1/{mount}/{*path}`: translate the HTTP call into a backend request.
pub async fn backend_handler(
    State(state): State<ApiState>,
    method: Method,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<AxumResponse, ApiError> {
    let operation = operation_for(&method, &params)?;
    let data = parse_body(&body)?;

    let mut request = Request::new(operation, path.clone(), state.storage.clone()).with_data(data);
    if let Some(token) = client_token(&headers) {
        request = request.with_client_token(token);
    }

    match state.backend.handle_request(request).await? {
        Some(response) => Ok(Json(envelope(&state, &path, response).await).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `PUT /v1/sys/leases/revoke`: run the revocation callback for one lease.
/// The lease is forgotten only after the backend reports success.
pub async fn revoke_lease_handler(
    State(state): State<ApiState>,
    Json(body): Json<LeaseRequestBody>,
) -> Result<StatusCode, ApiError> {
    let record = state
        .leases
        .get(&body.lease_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("lease '{}' not found", body.lease_id)))?;

    let request = Request::new(Operation::Revoke, record.path.clone(), state.storage.clone())
        .with_secret(record.secret.clone());
    state.backend.handle_request(request).await?;

    state.leases.remove(&record.lease_id).await;
    info!(lease_id = %record.lease_id, "Lease revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /v1/sys/leases/renew`: forwarded to the backend's renew handling.
pub async fn renew_lease_handler(
    State(state): State<ApiState>,
    Json(body): Json<LeaseRequestBody>,
) -> Result<AxumResponse, ApiError> {
    let record = state
        .leases
        .get(&body.lease_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("lease '{}' not found", body.lease_id)))?;

    let request = Request::new(Operation::Renew, record.path.clone(), state.storage.clone())
        .with_secret(record.secret.clone());

    match state.backend.handle_request(request).await? {
        Some(response) => Ok(Json(envelope(&state, &record.path, response).await).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `PUT /v1/sys/leases/tidy`: revoke every lease past its expiry.
/// Failed revocations stay registered for the next attempt.
pub async fn tidy_leases_handler(State(state): State<ApiState>) -> Json<TidyResponse> {
    let mut revoked = Vec::new();
    let mut failed = Vec::new();

    for record in state.leases.expired_at(Utc::now()).await {
        let request = Request::new(Operation::Revoke, record.path.clone(), state.storage.clone())
            .with_secret(record.secret.clone());

        match state.backend.handle_request(request).await {
            Ok(_) => {
                state.leases.remove(&record.lease_id).await;
                revoked.push(record.lease_id);
            }
            Err(e) => {
                warn!(
                    lease_id = %record.lease_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to revoke expired lease"
                );
                failed.push(record.lease_id);
            }
        }
    }

    info!(revoked = revoked.len(), failed = failed.len(), "Lease tidy completed");
    Json(TidyResponse { revoked, failed })
}

async fn envelope(state: &ApiState, path: &str, response: Response) -> SecretResponse {
    let (lease_id, lease_duration, renewable) = match response.secret {
        Some(secret) => {
            let ttl = secret.ttl.as_secs();
            let renewable = secret.renewable;
            let lease_id = state.leases.register(&state.mount, path, secret).await;
            (lease_id, ttl, renewable)
        }
        None => (String::new(), 0, false),
    };

    SecretResponse {
        request_id: Uuid::new_v4().to_string(),
        lease_id,
        lease_duration,
        renewable,
        data: response.data,
    }
}

fn operation_for(method: &Method, params: &HashMap<String, String>) -> Result<Operation, ApiError> {
    let list_requested = params.get("list").is_some_and(|v| v == "true");
    match method.as_str() {
        "GET" if list_requested => Ok(Operation::List),
        "GET" => Ok(Operation::Read),
        "PUT" | "POST" => Ok(Operation::Update),
        "DELETE" => Ok(Operation::Delete),
        "LIST" => Ok(Operation::List),
        other => Err(ApiError::method_not_allowed(format!("Method {} is not supported", other))),
    }
}

fn parse_body(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Invalid JSON body: {}", e))),
    }
}

fn client_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CLIENT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_operation_mapping() {
        let none = HashMap::new();
        assert_eq!(operation_for(&Method::GET, &none).unwrap(), Operation::Read);
        assert_eq!(operation_for(&Method::PUT, &none).unwrap(), Operation::Update);
        assert_eq!(operation_for(&Method::POST, &none).unwrap(), Operation::Update);
        assert_eq!(operation_for(&Method::DELETE, &none).unwrap(), Operation::Delete);
        assert_eq!(
            operation_for(&Method::from_bytes(b"LIST").unwrap(), &none).unwrap(),
            Operation::List
        );

        let list = HashMap::from([("list".to_string(), "true".to_string())]);
        assert_eq!(operation_for(&Method::GET, &list).unwrap(), Operation::List);

        assert!(operation_for(&Method::PATCH, &none).is_err());
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(&Bytes::new()).unwrap().is_empty());
        assert!(parse_body(&Bytes::from_static(b" \n")).unwrap().is_empty());
        assert_eq!(parse_body(&Bytes::from_static(br#"{"a":"b"}"#)).unwrap()["a"], "b");
        assert!(parse_body(&Bytes::from_static(b"[1]")).is_err());
        assert!(parse_body(&Bytes::from_static(b"{not json")).is_err());
    }

    #[test]
    fn test_client_token_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_token(&headers), None);

        headers.insert(CLIENT_TOKEN_HEADER, HeaderValue::from_static("  "));
        assert_eq!(client_token(&headers), None);

        headers.insert(CLIENT_TOKEN_HEADER, HeaderValue::from_static("s.abc"));
        assert_eq!(client_token(&headers).as_deref(), Some("s.abc"));
    }
}
