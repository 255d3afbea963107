//! Integration tests for resilience module
//!
//! Walks the retry decision table and the backoff schedule the way the HTTP
//! transport drives them: one decision per attempt, one delay per retry.

#![cfg(feature = "runtime")]

use std::time::Duration;

use paywire_common::resilience::{
    parse_should_retry_hint, should_retry, AttemptOutcome, CallState, NetworkBackoff,
    RetryDecision, StopReason, TransportFailure,
};

fn status(code: u16) -> AttemptOutcome<'static> {
    AttemptOutcome::Response { status: code, should_retry: None, error_code: None }
}

/// Validates the status-code heuristics applied when the server sends no
/// retry hint.
///
/// # Test Steps
/// 1. 409 conflicts retry
/// 2. 429 retries only with the `lock_timeout` code
/// 3. every 5xx retries
/// 4. other 4xx stop as not known to be safe
#[test]
fn test_status_code_heuristics() {
    assert!(should_retry(&status(409), CallState::Active, 0, 2).is_retry());

    let lock_timeout =
        AttemptOutcome::Response { status: 429, should_retry: None, error_code: Some("lock_timeout") };
    assert!(should_retry(&lock_timeout, CallState::Active, 0, 2).is_retry());

    let rate_limited =
        AttemptOutcome::Response { status: 429, should_retry: None, error_code: Some("rate_limit") };
    assert_eq!(
        should_retry(&rate_limited, CallState::Active, 0, 2),
        RetryDecision::Stop(StopReason::NotKnownSafe)
    );

    for code in [500, 502, 503, 504, 599] {
        assert!(should_retry(&status(code), CallState::Active, 0, 2).is_retry(), "{code}");
    }

    for code in [400, 401, 402, 403, 404] {
        assert_eq!(
            should_retry(&status(code), CallState::Active, 0, 2),
            RetryDecision::Stop(StopReason::NotKnownSafe),
            "{code}"
        );
    }
}

/// Validates that the retry budget is checked before anything else that
/// could ask for a retry.
#[test]
fn test_budget_exhaustion_wins() {
    let invited = AttemptOutcome::Response { status: 503, should_retry: Some(true), error_code: None };
    assert!(should_retry(&invited, CallState::Active, 1, 2).is_retry());
    assert_eq!(
        should_retry(&invited, CallState::Active, 2, 2),
        RetryDecision::Stop(StopReason::MaxRetriesExceeded)
    );
    assert_eq!(
        should_retry(
            &AttemptOutcome::Transport(TransportFailure::Transient),
            CallState::Active,
            0,
            0
        ),
        RetryDecision::Stop(StopReason::MaxRetriesExceeded)
    );
}

/// Validates that a cancelled caller stops retrying even on a retryable
/// failure.
#[test]
fn test_cancellation_stops_retrying() {
    assert_eq!(
        should_retry(
            &AttemptOutcome::Transport(TransportFailure::Transient),
            CallState::Cancelled,
            0,
            5
        ),
        RetryDecision::Stop(StopReason::Cancelled)
    );
}

/// Validates that the server hint, parsed from the raw header, overrides the
/// status heuristics in both directions.
#[test]
fn test_server_hint_overrides_status() {
    let declined = AttemptOutcome::Response {
        status: 503,
        should_retry: parse_should_retry_hint(Some("false")),
        error_code: None,
    };
    assert_eq!(
        should_retry(&declined, CallState::Active, 0, 2),
        RetryDecision::Stop(StopReason::ServerDeclined)
    );

    let invited = AttemptOutcome::Response {
        status: 400,
        should_retry: parse_should_retry_hint(Some("true")),
        error_code: None,
    };
    assert!(should_retry(&invited, CallState::Active, 0, 2).is_retry());
}

/// Validates the full schedule for a three-attempt call: two sleeps, each
/// within `[floor, base]` and the second never shorter than the floor.
#[test]
fn test_backoff_schedule_for_default_budget() {
    let backoff = NetworkBackoff::default();
    let mut total = Duration::ZERO;
    let mut retries = 0;

    while should_retry(&status(500), CallState::Active, retries, 2).is_retry() {
        let delay = backoff.delay(retries);
        assert!(delay >= Duration::from_millis(500));
        assert!(delay <= backoff.base_delay(retries));
        total += delay;
        retries += 1;
    }

    assert_eq!(retries, 2);
    assert!(total >= Duration::from_millis(1000));
    assert!(total <= Duration::from_millis(1500));
}

/// Validates custom bounds and the disabled-sleep switch used by tests.
#[test]
fn test_custom_bounds() {
    let backoff = NetworkBackoff::new(Duration::from_millis(10), Duration::from_millis(30));
    assert_eq!(backoff.base_delay(0), Duration::from_millis(10));
    assert_eq!(backoff.base_delay(1), Duration::from_millis(20));
    assert_eq!(backoff.base_delay(2), Duration::from_millis(30));

    let silent = backoff.with_sleep(false);
    assert_eq!(silent.delay(2), Duration::ZERO);
    assert_eq!(silent.base_delay(2), Duration::from_millis(30));
}
