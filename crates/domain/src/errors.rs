//! Error types surfaced to callers
//!
//! A failed call yields exactly one [`PaywireError`]. Errors decoded from the
//! server carry a boxed [`ApiError`] and are split by the payload's `type`
//! discriminator into the four typed categories; everything else (transport
//! failures, undecodable bodies, local validation) has its own variant.

use std::fmt;

use paywire_common::error::{ErrorClassification, ErrorSeverity};
use paywire_common::resilience::{
    outcome_decision, AttemptOutcome, TransportFailure, LOCK_TIMEOUT_CODE,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::REDACTED;
use crate::types::ApiResponse;

/// Discriminator of a decoded error payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorType {
    /// `api_error`: a fault on the server side.
    Api,
    /// `card_error`: the card was declined.
    Card,
    /// `idempotency_error`: a key was reused with different parameters.
    Idempotency,
    /// `invalid_request_error`: the request itself was rejected.
    InvalidRequest,
    /// Any type this client does not know about.
    Other(String),
}

impl ErrorType {
    /// Wire spelling of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Api => "api_error",
            Self::Card => "card_error",
            Self::Idempotency => "idempotency_error",
            Self::InvalidRequest => "invalid_request_error",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ErrorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "api_error" => Self::Api,
            "card_error" => Self::Card,
            "idempotency_error" => Self::Idempotency,
            "invalid_request_error" => Self::InvalidRequest,
            _ => Self::Other(value),
        }
    }
}

impl From<ErrorType> for String {
    fn from(value: ErrorType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error payload returned by the API.
///
/// The same struct decodes both the nested `{"error": {...}}` shape and the
/// flat OAuth shape, where only `error` and `error_description` are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_log_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_intent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(rename = "status", default, skip_serializing_if = "is_zero")]
    pub http_status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub oauth_error: Option<String>,
    #[serde(rename = "error_description", default, skip_serializing_if = "Option::is_none")]
    pub oauth_error_description: Option<String>,
    /// Envelope of the response this error was decoded from.
    #[serde(skip)]
    pub last_response: Option<ApiResponse>,
    /// `Stripe-Should-Retry` header of that response, when it was set.
    #[serde(skip)]
    pub should_retry: Option<bool>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u16) -> bool {
    *value == 0
}

impl ApiError {
    /// Copy safe for logging: intent client secrets are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for intent in [&mut copy.payment_intent, &mut copy.setup_intent].into_iter().flatten() {
            if let Some(object) = intent.as_object_mut() {
                let has_secret = object
                    .get("client_secret")
                    .and_then(Value::as_str)
                    .is_some_and(|secret| !secret.is_empty());
                if has_secret {
                    object.insert("client_secret".to_string(), Value::String(REDACTED.to_string()));
                }
            }
        }
        copy
    }

    /// 429 responses are only safe to retry when the server says the cause was
    /// lock contention.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        self.code.as_deref() == Some(LOCK_TIMEOUT_CODE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(&self.message),
        }
    }
}

/// Main error type for paywire
#[derive(Error, Debug, Clone)]
pub enum PaywireError {
    /// `api_error`
    #[error("{0}")]
    ApiFault(Box<ApiError>),

    /// `card_error`; `decline_code` says why.
    #[error("{0}")]
    CardDecline(Box<ApiError>),

    /// `idempotency_error`
    #[error("{0}")]
    IdempotencyConflict(Box<ApiError>),

    /// `invalid_request_error`
    #[error("{0}")]
    InvalidRequest(Box<ApiError>),

    /// Decoded payload without a known `type`, e.g. OAuth errors.
    #[error("{0}")]
    Api(Box<ApiError>),

    #[error(
        "Couldn't deserialize JSON (response status: {status}, body sample: '{body_sample}'): {message}"
    )]
    Decode { status: u16, body_sample: String, message: String },

    #[error("Network error: {message}")]
    Network { failure: TransportFailure, message: String },

    /// Local validation failure; never sent to the network.
    #[error("{0}")]
    Validation(String),

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for PaywireError {
    fn from(error: ApiError) -> Self {
        let boxed = Box::new(error);
        match boxed.error_type {
            Some(ErrorType::Api) => Self::ApiFault(boxed),
            Some(ErrorType::Card) => Self::CardDecline(boxed),
            Some(ErrorType::Idempotency) => Self::IdempotencyConflict(boxed),
            Some(ErrorType::InvalidRequest) => Self::InvalidRequest(boxed),
            Some(ErrorType::Other(_)) | None => Self::Api(boxed),
        }
    }
}

impl PaywireError {
    /// Decoded payload, for errors that came from the server.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::ApiFault(e)
            | Self::CardDecline(e)
            | Self::IdempotencyConflict(e)
            | Self::InvalidRequest(e)
            | Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the response that produced this error.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Decode { status, .. } => Some(*status),
            _ => self.api_error().map(|e| e.http_status_code),
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.api_error().and_then(|e| e.code.as_deref())
    }

    /// Decline reason of a card error.
    #[must_use]
    pub fn decline_code(&self) -> Option<&str> {
        match self {
            Self::CardDecline(e) => e.decline_code.as_deref(),
            _ => None,
        }
    }

    /// Server request id, when known.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.api_error().and_then(|e| e.request_id.as_deref())
    }

    /// Response envelope the error was decoded from.
    #[must_use]
    pub fn last_response(&self) -> Option<&ApiResponse> {
        self.api_error().and_then(|e| e.last_response.as_ref())
    }
}

impl ErrorClassification for PaywireError {
    fn is_retryable(&self) -> bool {
        let outcome = match self {
            Self::Network { failure, .. } => AttemptOutcome::Transport(*failure),
            _ => match self.api_error() {
                Some(e) => AttemptOutcome::Response {
                    status: e.http_status_code,
                    should_retry: e.should_retry,
                    error_code: e.code.as_deref(),
                },
                None => return false,
            },
        };
        outcome_decision(&outcome).is_retry()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            _ if self.http_status() == Some(402) => ErrorSeverity::Info,
            Self::Validation(_) | Self::Cancelled | Self::DeadlineExceeded => ErrorSeverity::Warning,
            Self::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Result type alias for paywire operations
pub type Result<T> = std::result::Result<T, PaywireError>;
