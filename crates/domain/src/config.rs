//! Configuration structures
//!
//! `PaywireConfig` is what the infra loader produces from the environment or
//! a config file. Each backend carries its own `BackendConfig`; unset fields
//! fall back to the protocol defaults in [`crate::constants`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_NETWORK_RETRIES};
use crate::types::{AppInfo, BackendKind};

/// Settings of a single backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL override. Trailing `/` and `/v1` are stripped.
    pub url: Option<String>,
    /// Retry ceiling; defaults to `DEFAULT_MAX_NETWORK_RETRIES`.
    pub max_network_retries: Option<u32>,
    /// Per-backend telemetry override of the global toggle.
    pub enable_telemetry: Option<bool>,
    /// Timeout of the default HTTP client, in seconds.
    pub http_timeout_secs: Option<u64>,
    /// `off`, `error`, `warn`, `info` or `debug`.
    pub log_level: Option<String>,
    /// Application info appended to the user agent.
    pub app_info: Option<AppInfo>,
}

impl BackendConfig {
    /// Base URL for `kind`, normalized.
    #[must_use]
    pub fn resolved_url(&self, kind: BackendKind) -> String {
        normalize_base_url(self.url.as_deref().unwrap_or_else(|| kind.default_url()))
    }

    /// Configured retry ceiling or the default.
    #[must_use]
    pub fn max_network_retries(&self) -> u32 {
        self.max_network_retries.unwrap_or(DEFAULT_MAX_NETWORK_RETRIES)
    }

    /// Configured HTTP timeout or the default.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout_secs.map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs)
    }
}

/// Full client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaywireConfig {
    /// Secret API key used when a call does not pass one explicitly.
    pub api_key: Option<String>,
    /// Process-wide telemetry switch.
    pub enable_telemetry: Option<bool>,
    pub api: BackendConfig,
    pub connect: BackendConfig,
    pub uploads: BackendConfig,
    pub meter_events: BackendConfig,
}

impl PaywireConfig {
    /// Settings for one backend.
    #[must_use]
    pub const fn backend(&self, kind: BackendKind) -> &BackendConfig {
        match kind {
            BackendKind::Api => &self.api,
            BackendKind::Connect => &self.connect,
            BackendKind::Uploads => &self.uploads,
            BackendKind::MeterEvents => &self.meter_events,
        }
    }

    /// Mutable settings for one backend.
    pub fn backend_mut(&mut self, kind: BackendKind) -> &mut BackendConfig {
        match kind {
            BackendKind::Api => &mut self.api,
            BackendKind::Connect => &mut self.connect,
            BackendKind::Uploads => &mut self.uploads,
            BackendKind::MeterEvents => &mut self.meter_events,
        }
    }
}

/// Strips one trailing `/` and then one trailing `/v1`.
///
/// Paths passed to the backends already start with `/v1`, so a base URL that
/// also ends in it would double the prefix.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    let url = url.strip_suffix('/').unwrap_or(url);
    url.strip_suffix("/v1").unwrap_or(url).to_string()
}
