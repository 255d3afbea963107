//! Conversions from transport errors into paywire errors.

use std::error::Error as StdError;

use once_cell::sync::Lazy;
use paywire_common::resilience::TransportFailure;
use paywire_domain::PaywireError;
use regex::Regex;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the paywire error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub PaywireError);

impl From<InfraError> for PaywireError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PaywireError> for InfraError {
    fn from(value: PaywireError) -> Self {
        Self(value)
    }
}

static REDIRECT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)too many redirects|stopped after \d+ redirects")
        .expect("REDIRECT_PATTERN should compile - this is a bug")
});
static SCHEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)scheme is not allowed|unsupported protocol scheme|URL scheme")
        .expect("SCHEME_PATTERN should compile - this is a bug")
});
static CERTIFICATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)certificate|UnknownIssuer|unknown authority")
        .expect("CERTIFICATE_PATTERN should compile - this is a bug")
});

/// Message of `err` and every error in its source chain.
fn chain_text(err: &HttpError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Sorts a failed send into the kinds the retry policy cares about.
///
/// Redirect loops, rejected schemes and untrusted certificates will fail the
/// same way on every attempt. Everything else is assumed transient.
#[must_use]
pub fn classify_transport_error(err: &HttpError) -> TransportFailure {
    let text = chain_text(err);
    if err.is_redirect() || REDIRECT_PATTERN.is_match(&text) {
        TransportFailure::TooManyRedirects
    } else if SCHEME_PATTERN.is_match(&text) {
        TransportFailure::UnsupportedScheme
    } else if CERTIFICATE_PATTERN.is_match(&text) {
        TransportFailure::UnknownAuthority
    } else {
        TransportFailure::Transient
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PaywireError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let failure = classify_transport_error(&value);
        let message = if value.is_timeout() {
            format!("request timed out: {}", chain_text(&value))
        } else {
            chain_text(&value)
        };
        Self(PaywireError::Network { failure, message })
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
