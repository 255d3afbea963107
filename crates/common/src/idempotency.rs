//! Idempotency keys
//!
//! A key lets the server recognise a retried write as the same logical
//! operation. Keys are `<unix-nanos>_<random>`: the timestamp keeps keys from
//! different moments apart and six characters of URL-safe base64 from the OS
//! random source keep concurrent calls apart.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Longest key the server accepts.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

const RANDOM_BYTES: usize = 4;
const RANDOM_CHARS: usize = 6;

/// Rejected caller-supplied key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdempotencyKeyError {
    #[error("cannot use an idempotency key longer than {MAX_IDEMPOTENCY_KEY_LEN} characters")]
    TooLong { length: usize },
}

/// Generates a fresh key.
///
/// # Panics
/// Panics if the operating system random source is unavailable. There is no
/// safe fallback for that environment fault.
#[must_use]
pub fn new_idempotency_key() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut bytes = [0_u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let encoded = URL_SAFE.encode(bytes);
    let random: String = encoded.chars().take(RANDOM_CHARS).collect();

    format!("{nanos}_{random}")
}

/// Trims a caller-supplied key and enforces the length ceiling.
///
/// # Errors
/// Returns [`IdempotencyKeyError::TooLong`] when the trimmed key exceeds
/// [`MAX_IDEMPOTENCY_KEY_LEN`] characters.
pub fn normalize_idempotency_key(key: &str) -> Result<String, IdempotencyKeyError> {
    let trimmed = key.trim();
    let length = trimmed.chars().count();
    if length > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(IdempotencyKeyError::TooLong { length });
    }
    Ok(trimmed.to_string())
}
