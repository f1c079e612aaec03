// src/logging.rs

//! Logging setup for `igniter` using `tracing` + `tracing-subscriber`.
//!
//! The subscriber is driven by an [`EnvFilter`] built from, in order:
//! 1. the `--log-level` CLI flag, applied to `igniter` targets only,
//! 2. the `IGNITER_LOG` environment variable, either a bare level name
//!    (`debug`) or full filter directives (`warn,igniter::task=trace`),
//! 3. `warn` for everything.
//!
//! Third-party crates stay at `warn` unless `IGNITER_LOG` names them.
//! Logs are sent to STDERR; STDOUT belongs to the task reporter.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "IGNITER_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Build the filter the subscriber is installed with.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = filter_directives(cli_level, env);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV} filter '{directives}'"))
}

/// Resolve the filter directive string.
///
/// A level name is scoped to `igniter` targets; anything else in
/// `IGNITER_LOG` is passed through as directives.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return scoped(level_from_log_level(lvl));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_level_str(raw) {
            Some(level) => scoped(level),
            None => raw.to_string(),
        },
        None => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn scoped(level: tracing::Level) -> String {
    format!(
        "{DEFAULT_DIRECTIVES},igniter={}",
        level.to_string().to_lowercase()
    )
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

/// Parse a level name as accepted by `IGNITER_LOG`.
pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
