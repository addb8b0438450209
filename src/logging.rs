//! Structured logging initialization
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. [`init_logging`] installs the subscriber used by the
//! `routecore-inspect` binary and is available to embedders that want the
//! same output.
//!
//! ## Environment Variables
//!
//! - `ROUTECORE_LOG_LEVEL` - trace/debug/info/warn/error (default: info)
//! - `ROUTECORE_LOG_FORMAT` - json/pretty (default: json)
//! - `ROUTECORE_LOG_ASYNC` - buffer output on a background thread (default: false)
//! - `ROUTECORE_LOG_TARGET_FILTER` - extra comma-separated `EnvFilter` directives
//!
//! `RUST_LOG`, when set, takes precedence over `ROUTECORE_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Write through a non-blocking background writer
    pub async_logging: bool,
    /// Additional filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("ROUTECORE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("ROUTECORE_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: lookup("ROUTECORE_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: lookup("ROUTECORE_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("ROUTECORE_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Configuration for local development: pretty, debug, synchronous
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Build the `EnvFilter` this configuration describes.
    ///
    /// Invalid directives in `target_filter` are reported on stderr and skipped.
    pub fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',') {
                let filter = filter.trim();
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {}", filter),
                }
            }
        }
        env_filter
    }
}

/// Install the global `tracing` subscriber.
///
/// With `async_logging` the returned guard must be kept alive for buffered
/// events to be flushed; dropping it flushes and stops the writer thread.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use routecore::logging::{init_logging, LogConfig};
///
/// let _guard = init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    registry
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json);
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_log_config_from_lookup() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("ROUTECORE_LOG_LEVEL", "debug"),
            ("ROUTECORE_LOG_FORMAT", "pretty"),
            ("ROUTECORE_LOG_ASYNC", "true"),
            ("ROUTECORE_LOG_TARGET_FILTER", "routecore::router=trace"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.async_logging);
        assert_eq!(config.target_filter.as_deref(), Some("routecore::router=trace"));
    }

    #[test]
    fn test_unparsable_flags_fall_back() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("ROUTECORE_LOG_ASYNC", "maybe"),
            ("ROUTECORE_LOG_TARGET_FILTER", "  "),
        ]));
        assert!(!config.async_logging);
        assert!(config.target_filter.is_none());
    }

    #[test]
    fn test_default_dev() {
        let config = LogConfig::default_dev();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_location);
    }
}
