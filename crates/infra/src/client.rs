//! Client facade
//!
//! A [`Client`] pairs an API key with a [`Backends`] registry so resource
//! code can make calls without threading either through every function.
//! Regular calls go to the API backend; use [`Client::backend`] for the
//! others.

use std::sync::Arc;

use paywire_common::form::Values;
use paywire_core::{
    Backend, LastResponseSetter, Params, ParamsContainer, RawParams, StreamingLastResponseSetter,
};
use paywire_domain::{ApiResponse, BackendKind, HttpMethod, PaywireConfig, PaywireError, Result};

use crate::backends::Backends;

/// API key plus the backends it is used with.
#[derive(Debug, Clone)]
pub struct Client {
    key: String,
    backends: Arc<Backends>,
}

impl Client {
    /// Client with default backends.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_backends(key, Arc::new(Backends::default()))
    }

    /// Client sharing an existing registry.
    pub fn with_backends(key: impl Into<String>, backends: Arc<Backends>) -> Self {
        Self { key: key.into(), backends }
    }

    /// Client built from loaded configuration.
    ///
    /// # Errors
    /// Returns `PaywireError::Config` when the configuration has no API key.
    pub fn from_config(config: PaywireConfig) -> Result<Self> {
        let key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PaywireError::Config("api_key is required".to_string()))?;
        Ok(Self::with_backends(key, Arc::new(Backends::new(config))))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn backends(&self) -> &Arc<Backends> {
        &self.backends
    }

    /// Backend for `kind` from this client's registry.
    pub fn backend(&self, kind: BackendKind) -> Result<Arc<dyn Backend>> {
        self.backends.get(kind)
    }

    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        self.backend(BackendKind::Api)?.call(method, path, &self.key, params, target).await
    }

    pub async fn call_streaming(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn StreamingLastResponseSetter,
    ) -> Result<()> {
        self.backend(BackendKind::Api)?
            .call_streaming(method, path, &self.key, params, target)
            .await
    }

    pub async fn call_raw(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Values>,
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        self.backend(BackendKind::Api)?
            .call_raw(method, path, &self.key, body, params, target)
            .await
    }

    /// Multipart uploads go to the uploads backend.
    pub async fn call_multipart(
        &self,
        method: HttpMethod,
        path: &str,
        boundary: &str,
        body: &[u8],
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        self.backend(BackendKind::Uploads)?
            .call_multipart(method, path, &self.key, boundary, body, params, target)
            .await
    }

    /// Sends `content` as-is through the API backend.
    pub async fn raw_request(
        &self,
        method: HttpMethod,
        path: &str,
        content: &str,
        params: Option<&RawParams>,
    ) -> Result<ApiResponse> {
        self.backends
            .get_raw_request(BackendKind::Api)?
            .raw_request(method, path, &self.key, content, params)
            .await
    }
}
