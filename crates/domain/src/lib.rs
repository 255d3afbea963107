//! # Paywire Domain
//!
//! Transport-level types shared by every paywire crate.
//!
//! This crate contains:
//! - Wire constants (endpoints, header names, retry defaults)
//! - The error taxonomy (`PaywireError`, `ApiError`) and `Result`
//! - The response envelope, backend identities and telemetry payloads
//! - Configuration structures
//!
//! ## Architecture
//! - Depends only on `paywire-common` utilities and its retry table
//! - No I/O; pure data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
