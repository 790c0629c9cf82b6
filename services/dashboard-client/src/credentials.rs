//! Credential Context - the client's view of the identity provider
//!
//! The surrounding application owns the session. The client only asks two
//! things of it: whether the user is signed in and, if so, the current access
//! token. On a 401 it additionally asks the session to start an interactive
//! re-login.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::CredentialError;

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Session state provided by the identity layer
#[async_trait]
pub trait CredentialContext: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Freshest token available. Implementations may renew silently.
    async fn access_token(&self) -> Result<AccessToken, CredentialError>;

    /// Kick off the interactive login flow. The client never awaits this on
    /// the request path.
    async fn start_interactive_login(&self);
}

/// Shared handle to a credential context
pub type SharedCredentials = Arc<dyn CredentialContext>;

/// Fixed-token context for scripted use
pub struct StaticCredentials {
    token: Option<AccessToken>,
}

impl StaticCredentials {
    pub fn new(token: Option<AccessToken>) -> Self {
        Self { token }
    }

    /// Read the token from an environment variable, unauthenticated if unset
    /// or empty
    pub fn from_env(var: &str) -> Self {
        let token = std::env::var(var)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(|t| AccessToken::new(t.trim()));
        Self { token }
    }
}

#[async_trait]
impl CredentialContext for StaticCredentials {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn access_token(&self) -> Result<AccessToken, CredentialError> {
        self.token.clone().ok_or(CredentialError::NoSession)
    }

    async fn start_interactive_login(&self) {
        warn!("Session rejected by backend; obtain a new access token and retry");
    }
}
