//! # Paywire Core
//!
//! Transport contracts - no HTTP client code.
//!
//! This crate contains:
//! - Per-call parameter objects and their extraction
//! - Port interfaces (traits) implemented by the transport
//! - Response targets that receive decoded bodies
//!
//! ## Architecture Principles
//! - Depends on `paywire-common` and `paywire-domain` only
//! - No sockets, no reqwest
//! - Resource clients talk to backends through traits

pub mod backend_ports;
pub mod params;
pub mod response;

// Re-export specific items to avoid ambiguity
pub use backend_ports::{Backend, RawRequestBackend};
pub use params::{
    extract_params, ListParams, ListParamsContainer, Params, ParamsContainer, RawParams,
};
pub use response::{
    ApiStream, ByteStream, LastResponseSetter, Resource, StreamingApiResponse,
    StreamingLastResponseSetter,
};
