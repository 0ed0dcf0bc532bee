//! # Error Types
//!
//! Error taxonomy for the Argo CD secrets backend using `thiserror`.

use std::fmt;

/// Custom result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the secrets backend
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Missing or invalid request fields
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Issuance path does not decompose into `{project}/{role}`
    #[error("Malformed credential path '{path}': expected '<project>/<role>'")]
    MalformedPath { path: String },

    /// Operation attempted before the admin configuration exists
    #[error("backend not configured")]
    NotConfigured,

    /// Caller identity absent
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Stored configuration cannot be turned into a working client
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The control-plane call itself failed
    #[error("Upstream error: {message}")]
    Upstream { message: String, status: Option<u16> },

    /// Host storage failure
    #[error("Storage error: {context}")]
    Storage { context: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Known path, unsupported operation
    #[error("Unsupported operation '{operation}' on path '{path}'")]
    UnsupportedOperation { operation: String, path: String },

    /// No registered path matches
    #[error("No handler for path '{path}'")]
    UnknownPath { path: String },

    /// Network transport errors for the HTTP listener
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal errors, including corrupted lease metadata
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by callers that need to branch on the error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    MalformedPath,
    NotConfigured,
    Unauthenticated,
    Configuration,
    Upstream,
    Storage,
    UnsupportedOperation,
    UnknownPath,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::MalformedPath => "malformed_path",
            ErrorKind::NotConfigured => "not_configured",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Upstream => "upstream_error",
            ErrorKind::Storage => "storage_error",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::UnknownPath => "unknown_path",
            ErrorKind::Internal => "internal_error",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a malformed path error
    pub fn malformed_path<S: Into<String>>(path: S) -> Self {
        Self::MalformedPath { path: path.into() }
    }

    /// Create an unauthenticated error
    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        Self::Unauthenticated { message: message.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Configuration { message: message.into(), source: Some(source) }
    }

    /// Create an upstream error without an HTTP status (transport failure)
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream { message: message.into(), status: None }
    }

    /// Create an upstream error carrying the control-plane status code
    pub fn upstream_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Upstream { message: message.into(), status: Some(status) }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(context: S) -> Self {
        Self::Storage { context: context.into() }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// Create an unsupported operation error
    pub fn unsupported<O: fmt::Display, P: Into<String>>(operation: O, path: P) -> Self {
        Self::UnsupportedOperation { operation: operation.to_string(), path: path.into() }
    }

    /// Create an unknown path error
    pub fn unknown_path<S: Into<String>>(path: S) -> Self {
        Self::UnknownPath { path: path.into() }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::MalformedPath { .. } => ErrorKind::MalformedPath,
            Error::NotConfigured => ErrorKind::NotConfigured,
            Error::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Storage { .. } => ErrorKind::Storage,
            Error::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Error::UnknownPath { .. } => ErrorKind::UnknownPath,
            Error::Serialization { .. }
            | Error::Transport(_)
            | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status reported by the control plane, if any
    pub fn upstream_status_code(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the host should retry the failed operation later.
    ///
    /// A missing configuration, a storage hiccup, a transport failure, or a
    /// 5xx/429 from the control plane can succeed on a later attempt. Anything
    /// else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NotConfigured | Error::Storage { .. } => true,
            Error::Upstream { status: None, .. } => true,
            Error::Upstream { status: Some(status), .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().map(|k| k.to_string()).collect();
        fields.sort();

        let message = fields
            .iter()
            .filter_map(|field| {
                field_errors.get(field.as_str()).and_then(|errs| errs.first()).map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect::<Vec<_>>()
            .join("; ");

        match fields.into_iter().next() {
            Some(field) => Self::validation_field(message, field),
            None => Self::validation("request validation failed"),
        }
    }
}
