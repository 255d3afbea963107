//! In-memory backend implementations for testing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;
use paywire_common::form::Values;
use paywire_core::{
    extract_params, Backend, LastResponseSetter, Params, ParamsContainer, RawParams,
    RawRequestBackend, StreamingApiResponse, StreamingLastResponseSetter,
};
use paywire_domain::{ApiResponse, HeaderValues, HttpMethod, PaywireError, Result};

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub key: String,
    pub body: String,
    pub stripe_account: Option<String>,
}

/// Backend that records every call and answers with a canned body.
pub struct RecordingBackend {
    response_body: Vec<u8>,
    calls: Mutex<Vec<RecordedCall>>,
    max_network_retries: AtomicU32,
}

impl RecordingBackend {
    pub fn new(response_body: &str) -> Self {
        Self {
            response_body: response_body.as_bytes().to_vec(),
            calls: Mutex::new(Vec::new()),
            max_network_retries: AtomicU32::new(2),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_network_retries(&self) -> u32 {
        self.max_network_retries.load(Ordering::SeqCst)
    }

    fn record(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        body: String,
        params: Option<&Params>,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            key: key.to_string(),
            body,
            stripe_account: params.and_then(|p| p.stripe_account.clone()),
        });
    }

    fn envelope(&self) -> ApiResponse {
        let mut headers = HeaderValues::new();
        headers.insert("request-id".to_string(), vec!["req_test".to_string()]);
        ApiResponse::new(200, "200 OK", headers, self.response_body.clone(), Default::default())
    }

    fn respond(&self, target: &mut dyn LastResponseSetter) -> Result<()> {
        let decoded = target.decode_body(&self.response_body);
        target.set_last_response(self.envelope());
        decoded.map_err(|e| PaywireError::Decode {
            status: 200,
            body_sample: String::from_utf8_lossy(&self.response_body).into_owned(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        let (values, common) = extract_params(params)?;
        self.call_raw(method, path, key, values.as_ref(), common, target).await
    }

    async fn call_streaming(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn StreamingLastResponseSetter,
    ) -> Result<()> {
        let (values, common) = extract_params(params)?;
        self.record(method, path, key, values.map(|v| v.encode()).unwrap_or_default(), common);

        let envelope = self.envelope();
        let chunks: Vec<Result<Vec<u8>>> = vec![Ok(self.response_body.clone())];
        target.set_last_response(StreamingApiResponse {
            headers: envelope.headers,
            idempotency_key: envelope.idempotency_key,
            body: Box::pin(stream::iter(chunks)),
            request_id: envelope.request_id,
            status: envelope.status,
            status_code: envelope.status_code,
            duration: envelope.duration,
        });
        Ok(())
    }

    async fn call_raw(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        body: Option<&Values>,
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        self.record(method, path, key, body.map(Values::encode).unwrap_or_default(), params);
        self.respond(target)
    }

    async fn call_multipart(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        _boundary: &str,
        body: &[u8],
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        self.record(method, path, key, String::from_utf8_lossy(body).into_owned(), params);
        self.respond(target)
    }

    fn set_max_network_retries(&self, max_network_retries: u32) {
        self.max_network_retries.store(max_network_retries, Ordering::SeqCst);
    }
}

#[async_trait]
impl RawRequestBackend for RecordingBackend {
    async fn raw_request(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        content: &str,
        params: Option<&RawParams>,
    ) -> Result<ApiResponse> {
        self.record(method, path, key, content.to_string(), params.map(|p| &p.params));
        Ok(self.envelope())
    }
}
