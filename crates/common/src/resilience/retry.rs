//! Retry decision table for HTTP attempts
//!
//! [`should_retry`] is a pure function of what happened on the last attempt,
//! the state of the caller's cancellation context and the retry budget. The
//! transport calls it after every attempt; the decision carries a reason so a
//! stop can be logged.
//!
//! Checks run in this order:
//!
//! 1. a successful response stops
//! 2. budget exhausted stops
//! 3. a cancelled context or an expired deadline stops
//! 4. transport failures retry unless known to be permanent (redirect loop,
//!    bad URL scheme, unknown certificate authority)
//! 5. a `Stripe-Should-Retry` hint wins over the heuristics below
//! 6. 409 retries, 429 retries only for a lock timeout, >= 500 retries
//! 7. anything else stops

use std::fmt;

use tracing::trace;

/// Error code the server attaches to a 429 that is safe to retry.
pub const LOCK_TIMEOUT_CODE: &str = "lock_timeout";

/// How an attempt failed below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    /// The redirect limit was hit.
    TooManyRedirects,
    /// The URL scheme cannot be spoken by the client.
    UnsupportedScheme,
    /// TLS validation failed because the issuer is not trusted.
    UnknownAuthority,
    /// Anything else: resets, refused connections, timeouts.
    Transient,
}

impl TransportFailure {
    /// Whether retrying could possibly help.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, Self::Transient)
    }
}

/// State of the caller's cancellation context after an attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CallState {
    #[default]
    Active,
    Cancelled,
    DeadlineExceeded,
}

/// What the last attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome<'a> {
    /// 2xx/3xx response.
    Success,
    /// No response was received.
    Transport(TransportFailure),
    /// An error response.
    Response {
        status: u16,
        /// Parsed `Stripe-Should-Retry` header.
        should_retry: Option<bool>,
        /// `code` of the decoded error body, if any.
        error_code: Option<&'a str>,
    },
}

/// Why the retry loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    Succeeded,
    MaxRetriesExceeded,
    Cancelled,
    DeadlineExceeded,
    TooManyRedirects,
    UnsupportedScheme,
    UnknownAuthority,
    ServerDeclined,
    NotKnownSafe,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Succeeded => "request succeeded",
            Self::MaxRetriesExceeded => "max retries exceeded",
            Self::Cancelled => "context canceled",
            Self::DeadlineExceeded => "context deadline exceeded",
            Self::TooManyRedirects => "stopped after too many redirects",
            Self::UnsupportedScheme => "unsupported protocol scheme",
            Self::UnknownAuthority => "certificate signed by unknown authority",
            Self::ServerDeclined => "`Stripe-Should-Retry` header returned `false`",
            Self::NotKnownSafe => "response not known to be safe for retry",
        };
        f.write_str(text)
    }
}

/// Decision for whether to make another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the backoff delay, then try again
    Retry,
    /// Return the last result to the caller
    Stop(StopReason),
}

impl RetryDecision {
    /// Shorthand for `matches!(self, RetryDecision::Retry)`.
    #[must_use]
    pub const fn is_retry(self) -> bool {
        matches!(self, Self::Retry)
    }
}

/// Decides whether to retry after an attempt.
///
/// `retries` is the number of retries already made (zero after the first
/// attempt); `max_retries` is the configured ceiling.
#[must_use]
pub fn should_retry(
    outcome: &AttemptOutcome<'_>,
    state: CallState,
    retries: u32,
    max_retries: u32,
) -> RetryDecision {
    let decision = decide(outcome, state, retries, max_retries);
    trace!(?outcome, ?state, retries, max_retries, ?decision, "network retry decision");
    decision
}

fn decide(
    outcome: &AttemptOutcome<'_>,
    state: CallState,
    retries: u32,
    max_retries: u32,
) -> RetryDecision {
    if matches!(outcome, AttemptOutcome::Success) {
        return RetryDecision::Stop(StopReason::Succeeded);
    }
    if retries >= max_retries {
        return RetryDecision::Stop(StopReason::MaxRetriesExceeded);
    }
    match state {
        CallState::Active => {}
        CallState::Cancelled => return RetryDecision::Stop(StopReason::Cancelled),
        CallState::DeadlineExceeded => return RetryDecision::Stop(StopReason::DeadlineExceeded),
    }

    outcome_decision(outcome)
}

/// Verdict on the outcome alone, ignoring the retry ceiling and the call's
/// cancellation state.
#[must_use]
pub fn outcome_decision(outcome: &AttemptOutcome<'_>) -> RetryDecision {
    match *outcome {
        AttemptOutcome::Success => RetryDecision::Stop(StopReason::Succeeded),
        AttemptOutcome::Transport(failure) => match failure {
            TransportFailure::TooManyRedirects => RetryDecision::Stop(StopReason::TooManyRedirects),
            TransportFailure::UnsupportedScheme => {
                RetryDecision::Stop(StopReason::UnsupportedScheme)
            }
            TransportFailure::UnknownAuthority => RetryDecision::Stop(StopReason::UnknownAuthority),
            TransportFailure::Transient => RetryDecision::Retry,
        },
        AttemptOutcome::Response { status, should_retry, error_code } => {
            match should_retry {
                Some(false) => return RetryDecision::Stop(StopReason::ServerDeclined),
                Some(true) => return RetryDecision::Retry,
                None => {}
            }
            match status {
                409 => RetryDecision::Retry,
                429 if error_code == Some(LOCK_TIMEOUT_CODE) => RetryDecision::Retry,
                s if s >= 500 => RetryDecision::Retry,
                _ => RetryDecision::Stop(StopReason::NotKnownSafe),
            }
        }
    }
}

/// Parses a `Stripe-Should-Retry` header value. Anything other than
/// `true`/`false` is treated as absent.
#[must_use]
pub fn parse_should_retry_hint(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> AttemptOutcome<'static> {
        AttemptOutcome::Response { status, should_retry: None, error_code: None }
    }

    #[test]
    fn success_always_stops() {
        assert_eq!(
            should_retry(&AttemptOutcome::Success, CallState::Active, 0, 2),
            RetryDecision::Stop(StopReason::Succeeded)
        );
    }

    #[test]
    fn hint_header_takes_precedence() {
        let declined = AttemptOutcome::Response {
            status: 500,
            should_retry: Some(false),
            error_code: None,
        };
        assert_eq!(
            should_retry(&declined, CallState::Active, 0, 2),
            RetryDecision::Stop(StopReason::ServerDeclined)
        );

        let invited = AttemptOutcome::Response { status: 400, should_retry: Some(true), error_code: None };
        assert!(should_retry(&invited, CallState::Active, 0, 2).is_retry());
    }

    #[test]
    fn permanent_transport_failures_stop() {
        for (failure, reason) in [
            (TransportFailure::TooManyRedirects, StopReason::TooManyRedirects),
            (TransportFailure::UnsupportedScheme, StopReason::UnsupportedScheme),
            (TransportFailure::UnknownAuthority, StopReason::UnknownAuthority),
        ] {
            assert!(failure.is_permanent());
            assert_eq!(
                should_retry(&AttemptOutcome::Transport(failure), CallState::Active, 0, 2),
                RetryDecision::Stop(reason)
            );
        }
        assert!(should_retry(
            &AttemptOutcome::Transport(TransportFailure::Transient),
            CallState::Active,
            0,
            2
        )
        .is_retry());
    }

    #[test]
    fn deadline_exceeded_stops() {
        assert_eq!(
            should_retry(&response(503), CallState::DeadlineExceeded, 0, 2),
            RetryDecision::Stop(StopReason::DeadlineExceeded)
        );
    }

    #[test]
    fn hint_parsing() {
        assert_eq!(parse_should_retry_hint(Some("true")), Some(true));
        assert_eq!(parse_should_retry_hint(Some("false")), Some(false));
        assert_eq!(parse_should_retry_hint(Some("maybe")), None);
        assert_eq!(parse_should_retry_hint(None), None);
    }

    #[test]
    fn stop_reason_messages() {
        assert_eq!(StopReason::MaxRetriesExceeded.to_string(), "max retries exceeded");
        assert_eq!(StopReason::Cancelled.to_string(), "context canceled");
    }
}
