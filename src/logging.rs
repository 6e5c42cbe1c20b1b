// src/logging.rs

//! Logging setup for `pollwatch` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` CLI flag: one level for every target.
//! 2. `POLLWATCH_LOG`: full `EnvFilter` directives, e.g.
//!    `"pollwatch=debug,notify=warn"`.
//! 3. [`DEFAULT_DIRECTIVES`].
//!
//! Everything goes to STDERR; stdout carries only the changed paths.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "POLLWATCH_LOG";

/// `notify` is chatty at debug level and rarely what the user is after.
pub const DEFAULT_DIRECTIVES: &str = "info,notify=warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI level and the raw `POLLWATCH_LOG` value.
///
/// Unparseable directives fall back to the default (with a note on stderr,
/// since no subscriber exists yet to log it).
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
            eprintln!("ignoring invalid {LOG_ENV}={directives:?}: {err}");
            EnvFilter::new(DEFAULT_DIRECTIVES)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    }
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
