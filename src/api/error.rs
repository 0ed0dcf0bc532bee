use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::{Error, ErrorKind};

#[derive(Debug)]
pub enum ApiError {
    BadRequest { kind: ErrorKind, message: String },
    Unauthorized(String),
    NotFound(String),
    MethodNotAllowed(String),
    BadGateway(String),
    ServiceUnavailable { kind: ErrorKind, message: String },
    Internal { kind: ErrorKind, message: String },
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest { kind: ErrorKind::Validation, message: msg.into() }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn method_not_allowed<S: Into<String>>(msg: S) -> Self {
        ApiError::MethodNotAllowed(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_kind, message) = match self {
            ApiError::BadRequest { kind, message }
            | ApiError::ServiceUnavailable { kind, message }
            | ApiError::Internal { kind, message } => (kind.to_string(), message),
            ApiError::Unauthorized(msg) => (ErrorKind::Unauthenticated.to_string(), msg),
            ApiError::NotFound(msg) => (ErrorKind::UnknownPath.to_string(), msg),
            ApiError::MethodNotAllowed(msg) => (ErrorKind::UnsupportedOperation.to_string(), msg),
            ApiError::BadGateway(msg) => (ErrorKind::Upstream.to_string(), msg),
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            Error::Validation { .. } | Error::MalformedPath { .. } | Error::NotConfigured => {
                ApiError::BadRequest { kind, message }
            }
            Error::Unauthenticated { .. } => ApiError::Unauthorized(message),
            Error::UnknownPath { .. } => ApiError::NotFound(message),
            Error::UnsupportedOperation { .. } => ApiError::MethodNotAllowed(message),
            ref e @ (Error::Upstream { .. } | Error::Storage { .. }) if e.is_retryable() => {
                ApiError::ServiceUnavailable { kind, message }
            }
            Error::Upstream { .. } => ApiError::BadGateway(message),
            _ => ApiError::Internal { kind, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::malformed_path("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::NotConfigured), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::unauthenticated("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::unknown_path("x")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::unsupported("list", "config/admin")),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(status_of(Error::upstream_status("denied", 403)), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(Error::upstream_status("down", 503)), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(Error::upstream("reset")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(Error::storage("sealed")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(Error::config("bad address")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(Error::internal("corrupt")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_kind_preserved() {
        assert!(matches!(
            ApiError::from(Error::NotConfigured),
            ApiError::BadRequest { kind: ErrorKind::NotConfigured, .. }
        ));
        assert!(matches!(
            ApiError::from(Error::config("bad")),
            ApiError::Internal { kind: ErrorKind::Configuration, .. }
        ));
    }
}
