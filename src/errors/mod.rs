//! # Error Handling
//!
//! This module provides error handling for the Argo CD secrets backend.
//! Every failure the backend can report is a variant of [`Error`]; the
//! variants follow the backend's error taxonomy so the host can tell
//! user mistakes, missing configuration and upstream outages apart.

pub mod types;

pub use types::{Error, ErrorKind, Result};
