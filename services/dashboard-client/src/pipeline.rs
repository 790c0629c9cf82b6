//! Request and response stages composed around the transport
//!
//! Both stages are free functions so they can be exercised without a network:
//! `inject_credentials` rewrites an outbound request, `recover` classifies a
//! finished exchange and names the context to re-login, if any.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::credentials::SharedCredentials;
use crate::error::{ClientError, Result};
use crate::transport::ResponseEnvelope;

/// Request stage
///
/// - no context, or not authenticated: request passes through untouched
/// - token available: `Authorization: Bearer <token>` is set
/// - token retrieval fails: logged, request passes through without credential
pub async fn inject_credentials(
    mut request: reqwest::Request,
    credentials: Option<&SharedCredentials>,
) -> reqwest::Request {
    let Some(credentials) = credentials else {
        return request;
    };

    if !credentials.is_authenticated() {
        return request;
    }

    match credentials.access_token().await {
        Ok(token) => match HeaderValue::from_str(&token.bearer()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!(
                    "Access token is not a valid header value; sending {} {} without credential",
                    request.method(),
                    request.url().path()
                );
            }
        },
        Err(e) => {
            warn!(
                "Failed to get access token, sending {} {} without credential: {}",
                request.method(),
                request.url().path(),
                e
            );
        }
    }

    request
}

/// Result of the response stage
pub struct Recovery {
    pub outcome: Result<ResponseEnvelope>,
    /// Context whose interactive login should be started, if any
    pub relogin: Option<SharedCredentials>,
}

impl Recovery {
    /// Start the pending re-login in the background and hand back the
    /// outcome without waiting for it. Needs a Tokio runtime when a re-login
    /// is pending.
    pub fn finish(self) -> Result<ResponseEnvelope> {
        if let Some(credentials) = self.relogin {
            tokio::spawn(async move {
                credentials.start_interactive_login().await;
            });
        }
        self.outcome
    }
}

/// Response stage
///
/// A 401 with a bound context becomes `AuthenticationRejected` and names the
/// context to re-login. Everything else passes through unchanged. Nothing is
/// spawned here; see `Recovery::finish`.
pub fn recover(
    outcome: Result<ResponseEnvelope>,
    credentials: Option<SharedCredentials>,
) -> Recovery {
    match outcome {
        Err(ClientError::Transport { status, body }) if status == StatusCode::UNAUTHORIZED => {
            match credentials {
                Some(credentials) => {
                    info!("Backend rejected credentials (401); starting interactive login");
                    Recovery {
                        outcome: Err(ClientError::AuthenticationRejected { body }),
                        relogin: Some(credentials),
                    }
                }
                None => {
                    debug!("401 with no credential context bound");
                    Recovery {
                        outcome: Err(ClientError::Transport { status, body }),
                        relogin: None,
                    }
                }
            }
        }
        other => Recovery {
            outcome: other,
            relogin: None,
        },
    }
}
