//! Error responses
//!
//! Turns a non-2xx/3xx response into a [`PaywireError`] and logs it at the
//! right level.

use std::time::Duration;

use paywire_common::error::{ErrorClassification, ErrorSeverity};
use paywire_common::resilience::parse_should_retry_hint;
use paywire_domain::constants::{ERROR_BODY_SAMPLE_LEN, HEADER_SHOULD_RETRY};
use paywire_domain::{ApiError, ApiResponse, BackendKind, HeaderValues, PaywireError};
use serde::Deserialize;

use crate::logging::{log_error, log_info, LeveledLogger};

/// Nested `{"error": {...}}` shape used by every backend except Connect.
#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    error: Option<ApiError>,
}

/// Decode failure carrying a printable sample of the body.
///
/// The sample is the first [`ERROR_BODY_SAMPLE_LEN`] bytes, cut on a
/// character boundary, with newlines escaped.
#[must_use]
pub fn decode_error(status: u16, body: &[u8], err: &serde_json::Error) -> PaywireError {
    let text = String::from_utf8_lossy(body);
    let mut sample = if text.len() > ERROR_BODY_SAMPLE_LEN {
        let mut end = ERROR_BODY_SAMPLE_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{} ...", &text[..end])
    } else {
        text.into_owned()
    };
    sample = sample.replace('\n', "\\n");

    PaywireError::Decode { status, body_sample: sample, message: err.to_string() }
}

/// Builds the error for a response with status >= 400.
///
/// Connect answers with a flat payload. Everyone else nests it under
/// `error`; a body without that key becomes a bare [`PaywireError::Api`]
/// whose message is the body itself. The `Stripe-Should-Retry` hint is kept
/// on the decoded error.
#[must_use]
pub fn response_to_error(
    kind: BackendKind,
    status_code: u16,
    status: &str,
    headers: HeaderValues,
    body: Vec<u8>,
    duration: Duration,
) -> PaywireError {
    let should_retry = parse_should_retry_hint(
        headers
            .get(&HEADER_SHOULD_RETRY.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str),
    );
    let decoded = if kind.uses_flat_errors() {
        serde_json::from_slice::<ApiError>(&body).map(Some)
    } else {
        serde_json::from_slice::<RawError>(&body).map(|raw| raw.error)
    };

    let mut error = match decoded {
        Ok(Some(error)) => error,
        Ok(None) => {
            return PaywireError::Api(Box::new(ApiError {
                http_status_code: status_code,
                message: String::from_utf8_lossy(&body).into_owned(),
                should_retry,
                ..ApiError::default()
            }))
        }
        Err(err) => return decode_error(status_code, &body, &err),
    };

    let envelope = ApiResponse::new(status_code, status, headers, body, duration);
    error.http_status_code = status_code;
    error.request_id = envelope.request_id.clone();
    error.last_response = Some(envelope);
    error.should_retry = should_retry;
    PaywireError::from(error)
}

/// Logs an error response.
///
/// Informational errors (a declined card and the like) go out at info; the
/// payload is redacted either way.
pub fn log_api_error(logger: &LeveledLogger, status_code: u16, err: &PaywireError) {
    match err.api_error() {
        Some(api_error) if err.severity() == ErrorSeverity::Info => {
            log_info!(
                logger,
                "User-compelled request error from Stripe (status {status_code}): {}",
                api_error.redacted()
            );
        }
        Some(api_error) => {
            log_error!(
                logger,
                "Request error from Stripe (status {status_code}): {}",
                api_error.redacted()
            );
        }
        None => {
            log_error!(logger, "Error decoding error from Stripe: {err}");
        }
    }
}
