//! Port interfaces for the HTTP transport
//!
//! Resource clients depend on these traits only; `paywire-infra` provides the
//! reqwest-backed implementation and tests can substitute their own.

use async_trait::async_trait;
use paywire_common::form::Values;
use paywire_domain::{ApiResponse, HttpMethod, Result};

use crate::params::{Params, ParamsContainer, RawParams};
use crate::response::{LastResponseSetter, StreamingLastResponseSetter};

/// Trait for executing API calls against one backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Form-encodes `params`, sends the request and decodes the response into
    /// `target`. `GET` and `DELETE` carry the encoding in the query string.
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()>;

    /// Like [`call`](Self::call) but hands the response body over as a stream.
    async fn call_streaming(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn StreamingLastResponseSetter,
    ) -> Result<()>;

    /// Sends an already encoded form body.
    async fn call_raw(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        body: Option<&Values>,
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()>;

    /// Sends a prebuilt `multipart/form-data` body.
    #[allow(clippy::too_many_arguments)]
    async fn call_multipart(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        boundary: &str,
        body: &[u8],
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()>;

    /// Changes the retry ceiling of subsequent calls.
    fn set_max_network_retries(&self, max_network_retries: u32);
}

/// Trait for sending untyped requests
#[async_trait]
pub trait RawRequestBackend: Send + Sync {
    /// Sends `content` verbatim: form encoded for `/v1` paths, JSON for `/v2`.
    async fn raw_request(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        content: &str,
        params: Option<&RawParams>,
    ) -> Result<ApiResponse>;
}
