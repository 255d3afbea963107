//! Modular common utilities shared across paywire crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: form encoding, idempotency keys, error classification,
//!   collections
//! - `runtime`: retry policy and backoff (adds `tracing`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod collections;
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod form;
#[cfg(feature = "foundation")]
pub mod idempotency;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use collections::{BoundedQueue, QueueFull};
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "foundation")]
pub use form::{encode_params, FormEncode, Values};
#[cfg(feature = "foundation")]
pub use idempotency::{new_idempotency_key, normalize_idempotency_key, IdempotencyKeyError};
#[cfg(feature = "runtime")]
pub use resilience::{
    should_retry, AttemptOutcome, CallState, NetworkBackoff, RetryDecision, StopReason,
    TransportFailure,
};
