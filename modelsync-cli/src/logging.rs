//! Logging setup for the CLI.
//!
//! Logs go to stderr so they never mix with command output.
//!
//! # Environment Variables
//!
//! - `MODELSYNC_DEBUG=true` - Enable debug logging
//! - `MODELSYNC_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `MODELSYNC_LOG_FORMAT=json|pretty|compact` - Set output format (default: compact)
//!
//! `-v` flags on the command line take precedence over the environment.

use std::env;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `MODELSYNC_DEBUG`.
pub fn is_debug_enabled() -> bool {
    env::var("MODELSYNC_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Resolve the log level from the command line and the environment.
pub fn log_level(verbosity: u8) -> &'static str {
    level_from(
        verbosity,
        env::var("MODELSYNC_LOG_LEVEL").ok().as_deref(),
        is_debug_enabled(),
    )
}

fn level_from(verbosity: u8, env_level: Option<&str>, debug: bool) -> &'static str {
    match verbosity {
        0 => {}
        1 => return "info",
        2 => return "debug",
        _ => return "trace",
    }

    match env_level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ if debug => "debug",
        _ => "warn",
    }
}

/// Get the configured log format from `MODELSYNC_LOG_FORMAT`.
pub fn log_format() -> &'static str {
    env::var("MODELSYNC_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "json" => "json",
            _ => "compact",
        })
        .unwrap_or("compact")
}

/// Initialize logging. Subsequent calls are no-ops.
pub fn init(verbosity: u8) {
    INIT.call_once(|| {
        let level = log_level(verbosity);
        let filter = EnvFilter::try_new(format!(
            "modelsync={},modelsync_cli={},modelsync_migrate={}",
            level, level, level
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let registry = tracing_subscriber::registry().with(filter);
        let result = match log_format() {
            "json" => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
            "pretty" => registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init(),
            _ => registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init(),
        };

        if result.is_ok() {
            tracing::debug!(level, format = log_format(), "Logging initialized");
        }
    });
}
