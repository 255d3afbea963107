//! Response envelope attached to every decoded resource

use std::collections::BTreeMap;
use std::time::Duration;

use crate::constants::{HEADER_IDEMPOTENCY_KEY, HEADER_REQUEST_ID};

/// Response headers keyed by lowercase name.
pub type HeaderValues = BTreeMap<String, Vec<String>>;

/// Metadata and raw body of one completed HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    /// Response headers, names lowercased.
    pub headers: HeaderValues,
    /// Idempotency key echoed back by the server.
    pub idempotency_key: Option<String>,
    /// Raw response body.
    pub raw_json: Vec<u8>,
    /// Server-side tracing identifier (`Request-Id`).
    pub request_id: Option<String>,
    /// Status line, e.g. `200 OK`.
    pub status: String,
    /// Numeric HTTP status.
    pub status_code: u16,
    /// Round-trip time of the attempt that produced this response.
    pub duration: Duration,
}

impl ApiResponse {
    /// Builds an envelope, lifting the request id and idempotency key out of
    /// the headers.
    #[must_use]
    pub fn new(
        status_code: u16,
        status: impl Into<String>,
        headers: HeaderValues,
        raw_json: Vec<u8>,
        duration: Duration,
    ) -> Self {
        let request_id = first_header(&headers, HEADER_REQUEST_ID);
        let idempotency_key = first_header(&headers, HEADER_IDEMPOTENCY_KEY);
        Self {
            headers,
            idempotency_key,
            raw_json,
            request_id,
            status: status.into(),
            status_code,
            duration,
        }
    }

    /// First value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).and_then(|v| v.first()).map(String::as_str)
    }

    /// Body as UTF-8 text, lossily converted.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_json).into_owned()
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }
}

fn first_header(headers: &HeaderValues, name: &str) -> Option<String> {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|values| values.first())
        .filter(|value| !value.is_empty())
        .cloned()
}
