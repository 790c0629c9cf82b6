//! HTTP transport - base URL, timeout and default headers, nothing about auth

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::request::RequestDescriptor;

/// Completed exchange with a 2xx status
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ResponseEnvelope {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body. An empty body decodes as JSON `null`, so `()` and
    /// `Option<T>` work for endpoints that return nothing.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Single-shot sender: one send per call, no retries
pub struct Transport {
    client: Client,
    config: ClientConfig,
}

impl Transport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.base_url(), path)
        } else {
            format!("{}/{}", self.config.base_url(), path)
        }
    }

    /// Turn a descriptor into a concrete request
    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Request> {
        let mut builder = self
            .client
            .request(descriptor.method.clone(), self.url(&descriptor.path));

        if !descriptor.query.is_empty() {
            builder = builder.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }
        if !descriptor.headers.is_empty() {
            builder = builder.headers(descriptor.headers.clone());
        }
        if let Some(timeout) = descriptor.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))
    }

    /// Send and classify: 2xx becomes an envelope, anything else a
    /// `ClientError::Transport` carrying status and body
    pub async fn send(&self, request: reqwest::Request) -> Result<ResponseEnvelope> {
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        let envelope = ResponseEnvelope {
            status,
            headers,
            body,
        };

        if status.is_success() {
            Ok(envelope)
        } else {
            Err(ClientError::Transport {
                status,
                body: envelope.text(),
            })
        }
    }
}
