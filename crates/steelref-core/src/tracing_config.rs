//! Tracing conventions and optional subscriber setup for steelref.
//!
//! Consumers may bring their own `tracing` subscriber; [`init_tracing`] is a
//! convenience for those who do not. Span and field names are centralized
//! here so dashboards and tests can match on them.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Target prefix used by all steelref tracing spans and events.
///
/// Filter steelref logs with:
/// ```text
/// STEELREF_LOG=steelref=debug
/// ```
pub const TARGET_PREFIX: &str = "steelref";

/// Standard span names used across the crates.
pub mod span_names {
    /// Search index construction.
    pub const INDEX_BUILD: &str = "steelref::index_build";
    /// One ranked query.
    pub const QUERY: &str = "steelref::query";
    /// One recommendation resolution.
    pub const RESOLVE: &str = "steelref::resolve";
    /// Catalog payload parsing.
    pub const CATALOG_LOAD: &str = "steelref::catalog_load";
    /// Offline worker install (precache).
    pub const PRECACHE: &str = "steelref::precache";
    /// Offline worker activation (generation cleanup).
    pub const ACTIVATE: &str = "steelref::activate";
    /// One intercepted fetch.
    pub const FETCH: &str = "steelref::fetch";
}

/// Standard structured field names used in tracing events.
pub mod field_names {
    pub const QUERY_LEN: &str = "query_len";
    pub const RESULT_COUNT: &str = "result_count";
    pub const RECORD_COUNT: &str = "record_count";
    pub const SKIPPED: &str = "skipped";
    pub const GRIND: &str = "grind";
    pub const TIER: &str = "tier";
    pub const URL: &str = "url";
    pub const STORE: &str = "store";
    pub const VERSION: &str = "version";
    pub const STRATEGY: &str = "strategy";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// The log level for the current environment: `STEELREF_LOG_LEVEL` when set
/// and recognized, otherwise the provided default.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("STEELREF_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

/// Install a formatted stderr subscriber.
///
/// Filter priority, highest first: `STEELREF_LOG` (per-target directives),
/// `RUST_LOG`, then `default` for everything. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing(default: Level) {
    let filter = std::env::var("STEELREF_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
