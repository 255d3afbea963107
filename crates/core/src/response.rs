//! Targets that receive decoded responses

use std::fmt;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::TryStreamExt;
use paywire_domain::{ApiResponse, HeaderValues, Result};
use serde::de::DeserializeOwned;

/// Receives a buffered response.
///
/// The transport first decodes the body into the target with
/// [`decode_body`](Self::decode_body), then hands over the envelope with
/// [`set_last_response`](Self::set_last_response). The envelope is set even
/// when decoding fails.
pub trait LastResponseSetter: Send {
    fn set_last_response(&mut self, response: ApiResponse);

    fn decode_body(&mut self, body: &[u8]) -> std::result::Result<(), serde_json::Error>;
}

/// A decoded resource together with the response it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    pub value: Option<T>,
    pub last_response: Option<ApiResponse>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self { value: None, last_response: None }
    }
}

impl<T> Resource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the decoded value, dropping the envelope.
    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T: DeserializeOwned + Send> LastResponseSetter for Resource<T> {
    fn set_last_response(&mut self, response: ApiResponse) {
        self.last_response = Some(response);
    }

    fn decode_body(&mut self, body: &[u8]) -> std::result::Result<(), serde_json::Error> {
        self.value = Some(serde_json::from_slice(body)?);
        Ok(())
    }
}

/// Body of a streamed response.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Metadata of a streamed response plus its unread body.
pub struct StreamingApiResponse {
    pub headers: HeaderValues,
    pub idempotency_key: Option<String>,
    pub body: ByteStream,
    pub request_id: Option<String>,
    pub status: String,
    pub status_code: u16,
    pub duration: Duration,
}

impl StreamingApiResponse {
    /// Reads the remaining body into memory.
    pub async fn collect_body(self) -> Result<Vec<u8>> {
        self.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
    }
}

impl fmt::Debug for StreamingApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingApiResponse")
            .field("headers", &self.headers)
            .field("idempotency_key", &self.idempotency_key)
            .field("request_id", &self.request_id)
            .field("status", &self.status)
            .field("status_code", &self.status_code)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Receives a streamed response.
pub trait StreamingLastResponseSetter: Send {
    fn set_last_response(&mut self, response: StreamingApiResponse);
}

/// Holder for a streamed response.
#[derive(Debug, Default)]
pub struct ApiStream {
    pub last_response: Option<StreamingApiResponse>,
}

impl StreamingLastResponseSetter for ApiStream {
    fn set_last_response(&mut self, response: StreamingApiResponse) {
        self.last_response = Some(response);
    }
}
