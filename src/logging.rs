//! Logging infrastructure.
//!
//! Structured logging controlled by the `JSONFK_DEBUG` environment variable.
//!
//! # Environment Variables
//!
//! - `JSONFK_DEBUG=true` - Enable debug logging
//! - `JSONFK_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific log level
//! - `JSONFK_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use jsonfk::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! Internally the crate logs through the standard tracing macros, e.g.
//! `debug!(sql = %sql, "compiled membership query")`.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `JSONFK_DEBUG`.
///
/// Returns `true` if set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("JSONFK_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `JSONFK_LOG_LEVEL`.
///
/// Defaults to "debug" if `JSONFK_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    if let Ok(level) = env::var("JSONFK_LOG_LEVEL") {
        match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => {
                if is_debug_enabled() {
                    "debug"
                } else {
                    "warn"
                }
            }
        }
    } else if is_debug_enabled() {
        "debug"
    } else {
        "warn"
    }
}

/// Get the configured log format from `JSONFK_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("JSONFK_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the logging system.
///
/// This should be called once at application startup. Subsequent calls are
/// no-ops. Without the `tracing-subscriber` feature this is silent and the
/// caller is expected to install its own subscriber.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("JSONFK_LOG_LEVEL").is_err() {
            // No logging requested, skip initialization
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{fmt, prelude::*, EnvFilter};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("jsonfk={}", level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
            }

            tracing::info!(level = level, format = get_log_format(), "logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Level falls back to warn and format to json when nothing is set.
        if env::var("JSONFK_DEBUG").is_err() && env::var("JSONFK_LOG_LEVEL").is_err() {
            assert_eq!(get_log_level(), "warn");
        }
        if env::var("JSONFK_LOG_FORMAT").is_err() {
            assert_eq!(get_log_format(), "json");
        }
    }
}
