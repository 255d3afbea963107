//! HTTP transport
//!
//! [`BackendImplementation`] is the reqwest-backed implementation of the
//! core backend ports: request building, the retry loop, error decoding and
//! telemetry.

pub mod backend;

pub use backend::{BackendBuilder, BackendImplementation};
