//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the router.
//!
//! ## Environment Variables
//!
//! ### `ROUTECORE_DEFAULT_ACCEPT`
//!
//! Accept type given to routes and filters registered without one.
//!
//! Default: `*/*`
//!
//! ### `ROUTECORE_SLOW_MATCH_US`
//!
//! Resolutions slower than this many microseconds are logged at `warn`
//! instead of `debug`. Accepts decimal (`1000`) or hexadecimal (`0x3e8`).
//!
//! Default: `1000` (1 ms)
//!
//! ## Usage
//!
//! ```rust
//! use routecore::runtime_config::RuntimeConfig;
//! use routecore::router::Router;
//!
//! let config = RuntimeConfig::from_env();
//! let router: Router<&str> = Router::with_config(config);
//! assert!(router.registry().is_empty());
//! ```

use std::env;
use std::time::Duration;

use crate::router::DEFAULT_ACCEPT_TYPE;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Accept type used when a registration does not give one
    pub default_accept_type: String,
    /// Resolutions slower than this are logged as slow
    pub slow_match_threshold: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_accept_type: DEFAULT_ACCEPT_TYPE.to_string(),
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Missing, empty or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_accept_type = lookup("ROUTECORE_DEFAULT_ACCEPT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_accept_type);

        let slow_match_threshold = lookup("ROUTECORE_SLOW_MATCH_US")
            .and_then(|val| parse_number(val.trim()))
            .map(Duration::from_micros)
            .unwrap_or(defaults.slow_match_threshold);

        RuntimeConfig {
            default_accept_type,
            slow_match_threshold,
        }
    }
}

fn parse_number(val: &str) -> Option<u64> {
    if let Some(hex) = val.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
