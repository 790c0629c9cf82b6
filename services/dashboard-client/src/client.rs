//! Authenticated Dashboard API Client

use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::cache::CacheInvalidator;
use crate::config::ClientConfig;
use crate::credentials::SharedCredentials;
use crate::error::Result;
use crate::pipeline;
use crate::request::RequestDescriptor;
use crate::transport::{ResponseEnvelope, Transport};

/// Client for the trading-bot dashboard backend
///
/// Every call runs credential injection, a single transport send, then
/// failure recovery. The credential context is a replaceable handle: swapping
/// it only affects calls that have not yet reached injection.
pub struct DashboardClient {
    transport: Transport,
    credentials: ArcSwapOption<SharedCredentials>,
    invalidator: Option<Arc<dyn CacheInvalidator>>,
}

impl DashboardClient {
    /// Create a client with no credential context bound
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            credentials: ArcSwapOption::empty(),
            invalidator: None,
        })
    }

    pub fn with_credentials(self, credentials: SharedCredentials) -> Self {
        self.set_credential_context(Some(credentials));
        self
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// Bind, replace or clear the credential context
    pub fn set_credential_context(&self, credentials: Option<SharedCredentials>) {
        self.credentials.store(credentials.map(Arc::new));
    }

    /// Currently bound credential context
    pub fn credential_context(&self) -> Option<SharedCredentials> {
        self.credentials
            .load_full()
            .map(|bound| SharedCredentials::clone(&bound))
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub(crate) fn invalidator(&self) -> Option<&Arc<dyn CacheInvalidator>> {
        self.invalidator.as_ref()
    }

    /// Run one call through the full pipeline
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<ResponseEnvelope> {
        let request = self.transport.build(&descriptor)?;

        let credentials = self.credential_context();
        let request = pipeline::inject_credentials(request, credentials.as_ref()).await;

        debug!("{} {}", request.method(), request.url());
        let outcome = self.transport.send(request).await;

        // Re-login goes to the session that supplied (or declined) the
        // credential, even if the handle was replaced during the send
        pipeline::recover(outcome, credentials).finish()
    }

    /// Execute and decode the JSON body
    pub async fn request<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        self.execute(descriptor).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(RequestDescriptor::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        self.request(with_body(RequestDescriptor::post(path), body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        self.request(with_body(RequestDescriptor::put(path), body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        self.request(with_body(RequestDescriptor::patch(path), body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(RequestDescriptor::delete(path)).await
    }
}

fn with_body<B: Serialize + ?Sized>(
    descriptor: RequestDescriptor,
    body: Option<&B>,
) -> Result<RequestDescriptor> {
    match body {
        Some(body) => descriptor.json(body),
        None => Ok(descriptor),
    }
}
