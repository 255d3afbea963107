//! Response handling shared by every backend
//!
//! Error bodies are decoded per backend shape, stamped with the response
//! envelope and logged with the payload redacted.

pub mod errors;

pub use errors::{decode_error, log_api_error, response_to_error};
