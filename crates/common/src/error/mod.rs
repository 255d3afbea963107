//! Error classification shared by every paywire crate
//!
//! Crates keep their own error enums; this module gives them a common way to
//! answer the questions the transport asks of any error:
//!
//! 1. **`ErrorClassification` trait**: is it worth retrying, how severe is it,
//!    does it need immediate attention
//! 2. **`ErrorSeverity` enum**: one severity scale used to pick log levels
//!
//! ```rust
//! use paywire_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Timeout,
//!     Declined,
//! }
//!
//! impl ErrorClassification for FetchError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Timeout => ErrorSeverity::Warning,
//!             Self::Declined => ErrorSeverity::Info,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         false
//!     }
//! }
//!
//! assert!(FetchError::Timeout.is_retryable());
//! assert_eq!(FetchError::Declined.severity(), ErrorSeverity::Info);
//! ```

use std::fmt;

/// Standard classification interface for errors
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as connection resets, lock contention or server faults.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    ///
    /// Critical errors indicate broken internal invariants rather than
    /// anything the remote side did.
    fn is_critical(&self) -> bool;
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Expected outcome, e.g. a declined card
    Info,
    /// Worth watching, not a fault
    Warning,
    /// Requires attention
    Error,
    /// Immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
