//! Error type shared by the session manager, the gateways and the binary.

use http::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between the caller and the remote services.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No usable credentials: the session had no refresh token, or a guarded
    /// route was entered without a live session.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The refresh round-trip failed or was rejected; the session has been
    /// logged out by the time this is returned.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Box<ClientError>),

    /// A remote call answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// Transport level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response whose body is unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the failure means the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::AuthenticationRequired | ClientError::RefreshFailed(_)
        ) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Result alias used across the crate.
pub type ClientResult<T> = Result<T, ClientError>;
