//! Client Configuration

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Local development backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Environment variable prefix (`DASHBOARD_BASE_URL`, `DASHBOARD_TIMEOUT_MS`)
const ENV_PREFIX: &str = "DASHBOARD";

/// Transport configuration, immutable once the client is built
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    base_url: String,
    timeout_ms: u64,
}

impl ClientConfig {
    /// Validate and build a configuration
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');

        if base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base URL is empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must be http(s): {}",
                base_url
            )));
        }
        if timeout.is_zero() {
            return Err(ClientError::InvalidConfig("timeout must be non-zero".to_string()));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            timeout,
        })
    }

    /// Load configuration: defaults, then an optional TOML file, then
    /// `DASHBOARD_*` environment variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration from defaults and environment only
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(None)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(prefix))
            .build()
            .context("Failed to read client configuration")?;

        let raw: RawSettings = settings
            .try_deserialize()
            .context("Malformed client configuration")?;

        Ok(Self::new(&raw.base_url, Duration::from_millis(raw.timeout_ms))?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}
