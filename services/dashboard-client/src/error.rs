//! Error types for the dashboard client

use reqwest::StatusCode;

/// Failure reported by a credential context while producing an access token
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No active session")]
    NoSession,

    #[error("Token retrieval failed: {0}")]
    Retrieval(String),
}

/// Errors surfaced to callers of the client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered 401. Interactive re-login has already been
    /// triggered when a credential context was bound.
    #[error("Authentication rejected: {body}")]
    AuthenticationRejected { body: String },

    /// Any other non-2xx answer
    #[error("Request failed: {status} - {body}")]
    Transport { status: StatusCode, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::AuthenticationRejected { .. } => Some(StatusCode::UNAUTHORIZED),
            ClientError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ClientError::AuthenticationRejected { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e)
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
