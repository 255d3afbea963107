//! # Paywire Infrastructure
//!
//! Infrastructure implementations of the core backend ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP backend (request building, retries, telemetry)
//! - Error response decoding and transport error conversions
//! - The backend registry and the `Client` facade
//! - Configuration loading from environment variables and files
//!
//! ## Architecture
//! - Implements traits defined in `paywire-core`
//! - Depends on `paywire-common`, `paywire-domain` and `paywire-core`
//! - Contains all "impure" code (network I/O, process lookups, env access)

pub mod api;
pub mod backends;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod telemetry;
pub mod user_agent;

// Re-export commonly used items
pub use backends::{
    get_backend, get_backend_with_config, get_raw_request_backend, set_backend, Backends,
};
pub use client::Client;
pub use errors::InfraError;
pub use http::{BackendBuilder, BackendImplementation};
pub use logging::LeveledLogger;
pub use telemetry::{set_telemetry_enabled, telemetry_enabled, TelemetryBuffer};
