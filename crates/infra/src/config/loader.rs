//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `PAYWIRE_API_KEY` is set, loads from environment variables and
//!    reports any malformed value
//! 2. Otherwise falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PAYWIRE_API_KEY`: Secret API key (required for env loading)
//! - `PAYWIRE_API_URL`, `PAYWIRE_CONNECT_URL`, `PAYWIRE_UPLOADS_URL`,
//!   `PAYWIRE_METER_EVENTS_URL`: Base URL overrides per backend
//! - `PAYWIRE_MAX_NETWORK_RETRIES`: Retry ceiling for every backend
//! - `PAYWIRE_ENABLE_TELEMETRY`: Client telemetry (true/false)
//! - `PAYWIRE_HTTP_TIMEOUT_SECS`: Timeout of the default HTTP client
//! - `PAYWIRE_LOG_LEVEL`: `off`, `error`, `warn`, `info` or `debug`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `$PAYWIRE_CONFIG`
//! 2. `./paywire.toml` or `./paywire.json` (current working directory)
//! 3. `./config/paywire.toml` or `./config/paywire.json`
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use paywire_domain::{BackendKind, PaywireConfig, PaywireError, Result};

use crate::logging::LeveledLogger;

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `PAYWIRE_API_KEY` is set; a bad value
/// among them is an error rather than a reason to read a file instead. Without
/// the key, falls back to loading from a config file.
///
/// # Errors
/// Returns `PaywireError::Config` if:
/// - An environment variable cannot be parsed
/// - No config file is found when the key is unset
/// - File format is invalid
pub fn load() -> Result<PaywireConfig> {
    if env_var("PAYWIRE_API_KEY").is_err() {
        tracing::debug!("PAYWIRE_API_KEY not set, loading configuration from file");
        return load_from_file(None);
    }
    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// `PAYWIRE_API_KEY` must be present; every other variable is optional and
/// applies to all backends unless it names one.
///
/// # Errors
/// Returns `PaywireError::Config` if the key is missing or a value cannot be
/// parsed.
pub fn load_from_env() -> Result<PaywireConfig> {
    let mut config = PaywireConfig { api_key: Some(env_var("PAYWIRE_API_KEY")?), ..PaywireConfig::default() };

    for (kind, key) in [
        (BackendKind::Api, "PAYWIRE_API_URL"),
        (BackendKind::Connect, "PAYWIRE_CONNECT_URL"),
        (BackendKind::Uploads, "PAYWIRE_UPLOADS_URL"),
        (BackendKind::MeterEvents, "PAYWIRE_METER_EVENTS_URL"),
    ] {
        config.backend_mut(kind).url = std::env::var(key).ok().filter(|url| !url.trim().is_empty());
    }

    let max_network_retries = env_parse::<u32>("PAYWIRE_MAX_NETWORK_RETRIES", "max network retries")?;
    let http_timeout_secs = env_parse::<u64>("PAYWIRE_HTTP_TIMEOUT_SECS", "HTTP timeout")?;
    let log_level = std::env::var("PAYWIRE_LOG_LEVEL").ok();
    if let Some(level) = log_level.as_deref() {
        LeveledLogger::from_str(level)?;
    }
    config.enable_telemetry = env_bool("PAYWIRE_ENABLE_TELEMETRY")?;

    for kind in BackendKind::ALL {
        let backend = config.backend_mut(kind);
        backend.max_network_retries = max_network_retries;
        backend.http_timeout_secs = http_timeout_secs;
        backend.log_level.clone_from(&log_level);
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PaywireError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<PaywireConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PaywireError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PaywireError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PaywireError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`). Log levels are
/// checked here so a typo fails at load time rather than on first request.
fn parse_config(contents: &str, path: &Path) -> Result<PaywireConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: PaywireConfig = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PaywireError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| PaywireError::Config(format!("Invalid JSON format: {e}")))?,
        _ => return Err(PaywireError::Config(format!("Unsupported config format: {extension}"))),
    };

    for kind in BackendKind::ALL {
        if let Some(level) = config.backend(kind).log_level.as_deref() {
            LeveledLogger::from_str(level)?;
        }
    }
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches `$PAYWIRE_CONFIG` first, then the current working directory,
/// then the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(explicit) = std::env::var_os("PAYWIRE_CONFIG") {
        candidates.push(PathBuf::from(explicit));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(standard_candidates(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(standard_candidates(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

fn standard_candidates(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("paywire.toml"),
        dir.join("paywire.json"),
        dir.join("config/paywire.toml"),
        dir.join("config/paywire.json"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `PaywireError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty()).ok_or_else(|| {
        PaywireError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable.
fn env_parse<T: FromStr>(key: &str, what: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|s| {
            s.trim().parse::<T>().map_err(|e| PaywireError::Config(format!("Invalid {what}: {e}")))
        })
        .transpose()
}

/// Parse an optional boolean environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Errors
/// Returns `PaywireError::Config` for any other value.
fn env_bool(key: &str) -> Result<Option<bool>> {
    std::env::var(key)
        .ok()
        .map(|s| match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(PaywireError::Config(format!("Invalid boolean for {key}: {other}"))),
        })
        .transpose()
}
