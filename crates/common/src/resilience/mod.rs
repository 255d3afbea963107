//! Resilience patterns for network calls
//!
//! - **[`retry`]**: the retry decision table applied after every HTTP attempt
//! - **[`backoff`]**: the sleep schedule between attempts
//!
//! Both are pure; the transport owns the loop, the sleeping and the
//! cancellation.

pub mod backoff;
pub mod retry;

pub use backoff::NetworkBackoff;
pub use retry::{
    outcome_decision, parse_should_retry_hint, should_retry, AttemptOutcome, CallState,
    RetryDecision, StopReason, TransportFailure, LOCK_TIMEOUT_CODE,
};
