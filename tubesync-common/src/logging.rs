//! Logging setup.
//!
//! The library only emits `tracing` events. Applications that do not install
//! their own subscriber can call [`init`] once at startup, which honours:
//!
//! - `TUBESYNC_DEBUG=true|1|yes` - enable debug output
//! - `TUBESYNC_LOG_LEVEL=trace|debug|info|warn|error` - explicit level
//! - `TUBESYNC_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! Installing the subscriber requires the `tracing-subscriber` feature.
//!
//! ```rust,no_run
//! use tubesync_common::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TUBESYNC_DEBUG";
const LEVEL_VAR: &str = "TUBESYNC_LOG_LEVEL";
const FORMAT_VAR: &str = "TUBESYNC_LOG_FORMAT";

/// Check if debug logging is enabled via `TUBESYNC_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Resolve the log level from `TUBESYNC_LOG_LEVEL` and `TUBESYNC_DEBUG`.
///
/// An unrecognized level is ignored. Falls back to "debug" when debug
/// logging is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// Map a requested level onto a known one.
fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Resolve the output format, "json" unless `TUBESYNC_LOG_FORMAT` says otherwise.
pub fn get_log_format() -> &'static str {
    env::var(FORMAT_VAR)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install the global subscriber. Subsequent calls are no-ops.
///
/// Nothing is installed unless `TUBESYNC_DEBUG` or `TUBESYNC_LOG_LEVEL` is set.
pub fn init() {
    init_inner(None, false);
}

/// Install the global subscriber at `level`, ignoring `TUBESYNC_LOG_LEVEL`.
pub fn init_with_level(level: &str) {
    init_inner(Some(level), false);
}

/// Install the global subscriber with debug output enabled.
pub fn init_debug() {
    init_inner(None, true);
}

/// Shared setup. The arguments take precedence over the environment, which
/// is only read, never modified.
fn init_inner(level: Option<&str>, debug: bool) {
    INIT.call_once(|| {
        let env_level = env::var(LEVEL_VAR).ok();
        let debug = debug || is_debug_enabled();
        let requested = level.or(env_level.as_deref());
        if !debug && requested.is_none() {
            return;
        }
        let level = resolve_level(requested, debug);

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!("tubesync={level},tubesync_common={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = get_log_format(), "TubeSync logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = level;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level_explicit() {
        assert_eq!(resolve_level(Some("INFO"), false), "info");
        assert_eq!(resolve_level(Some("trace"), true), "trace");
        assert_eq!(resolve_level(Some("error"), true), "error");
    }

    #[test]
    fn test_resolve_level_fallback() {
        assert_eq!(resolve_level(None, false), "warn");
        assert_eq!(resolve_level(None, true), "debug");
        assert_eq!(resolve_level(Some("loud"), false), "warn");
        assert_eq!(resolve_level(Some("loud"), true), "debug");
    }
}
