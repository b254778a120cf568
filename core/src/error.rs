//! Error type for the project API client.
//!
//! # Design
//! Every failure carries exactly one user-facing message, available through
//! `Display`. Server-side failures are normalized into `Http` by
//! `client::error_message`; the structured problem body never leaves the
//! client. The remaining variants cover the places the round-trip can break
//! before a status code is known.

use thiserror::Error;

/// Errors returned by `ProjectClient` parse methods, transports, and
/// `ProjectApi` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, reset,
    /// body read failure).
    #[error("network error: {0}")]
    Transport(String),

    /// A 2xx response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
