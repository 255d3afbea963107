//! Per-backend log filtering
//!
//! Every backend owns a [`LeveledLogger`] that decides which of its events
//! reach `tracing`. The global subscriber still applies its own filter on top;
//! this one only lets an application quieten the transport without touching
//! its subscriber setup.

use std::fmt;
use std::str::FromStr;

use paywire_domain::PaywireError;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Level threshold for transport events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeveledLogger {
    level: LevelFilter,
}

impl Default for LeveledLogger {
    /// Errors only.
    fn default() -> Self {
        Self::new(LevelFilter::ERROR)
    }
}

impl LeveledLogger {
    #[must_use]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Logger that emits nothing.
    #[must_use]
    pub const fn off() -> Self {
        Self::new(LevelFilter::OFF)
    }

    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }

    /// Whether events at `level` pass this logger.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Parses an optional level name, defaulting to errors only.
    pub fn from_name(name: Option<&str>) -> Result<Self, PaywireError> {
        name.map_or_else(|| Ok(Self::default()), str::parse)
    }
}

impl FromStr for LeveledLogger {
    type Err = PaywireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => LevelFilter::OFF,
            "error" => LevelFilter::ERROR,
            "warn" | "warning" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            other => {
                return Err(PaywireError::Config(format!(
                    "Invalid log level: {other} (expected off, error, warn, info or debug)"
                )))
            }
        };
        Ok(Self::new(level))
    }
}

impl fmt::Display for LeveledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)
    }
}

macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.enabled(::tracing::Level::ERROR) {
            ::tracing::error!($($arg)+);
        }
    };
}

macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.enabled(::tracing::Level::WARN) {
            ::tracing::warn!($($arg)+);
        }
    };
}

macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.enabled(::tracing::Level::INFO) {
            ::tracing::info!($($arg)+);
        }
    };
}

macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        if $logger.enabled(::tracing::Level::DEBUG) {
            ::tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use {log_debug, log_error, log_info, log_warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_errors_only() {
        let logger = LeveledLogger::default();
        assert!(logger.enabled(Level::ERROR));
        assert!(!logger.enabled(Level::WARN));
        assert!(!logger.enabled(Level::INFO));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("off".parse::<LeveledLogger>().unwrap(), LeveledLogger::off());
        assert_eq!(" INFO ".parse::<LeveledLogger>().unwrap().level(), LevelFilter::INFO);
        assert_eq!("warning".parse::<LeveledLogger>().unwrap().level(), LevelFilter::WARN);
        assert!(matches!("trace".parse::<LeveledLogger>(), Err(PaywireError::Config(_))));
        assert_eq!(LeveledLogger::from_name(None).unwrap(), LeveledLogger::default());
    }

    #[test]
    fn debug_logger_lets_everything_through() {
        let logger = LeveledLogger::new(LevelFilter::DEBUG);
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG] {
            assert!(logger.enabled(level));
        }
        assert!(!logger.enabled(Level::TRACE));
        assert!(!LeveledLogger::off().enabled(Level::ERROR));
    }
}
