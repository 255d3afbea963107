//! Wire constants
//!
//! Centralized location for protocol-level constants shared by every backend:
//! endpoint URLs, header names, retry defaults and telemetry sizing.

use std::time::Duration;

// Protocol
pub const API_VERSION: &str = "2024-12-18.acacia";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const USER_AGENT_PREFIX: &str = "Stripe/v1 RustBindings";
pub const PUBLISHER: &str = "paywire";
pub const UNKNOWN_PLATFORM: &str = "unknown platform";

// Default endpoints
pub const API_URL: &str = "https://api.stripe.com";
pub const CONNECT_URL: &str = "https://connect.stripe.com";
pub const UPLOADS_URL: &str = "https://files.stripe.com";
pub const METER_EVENTS_URL: &str = "https://meter-events.stripe.com";

// Content types
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

// Request headers
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_IDEMPOTENCY_KEY: &str = "Idempotency-Key";
pub const HEADER_STRIPE_ACCOUNT: &str = "Stripe-Account";
pub const HEADER_STRIPE_CONTEXT: &str = "Stripe-Context";
pub const HEADER_STRIPE_VERSION: &str = "Stripe-Version";
pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_CLIENT_USER_AGENT: &str = "X-Stripe-Client-User-Agent";
pub const HEADER_CLIENT_TELEMETRY: &str = "X-Stripe-Client-Telemetry";

// Response headers
pub const HEADER_REQUEST_ID: &str = "Request-Id";
pub const HEADER_SHOULD_RETRY: &str = "Stripe-Should-Retry";

// Retry behaviour
pub const DEFAULT_MAX_NETWORK_RETRIES: u32 = 2;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(80);

// Telemetry
pub const TELEMETRY_BUFFER_SIZE: usize = 16;
pub const RAW_REQUEST_USAGE: &str = "raw_request";

// Error decoding
pub const ERROR_BODY_SAMPLE_LEN: usize = 500;
pub const REDACTED: &str = "REDACTED";
