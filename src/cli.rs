// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::BackendKind;

/// Command-line arguments for `pollwatch`.
///
/// Every flag overrides the matching `[listener]` key of the config file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pollwatch",
    version,
    about = "Report files added, modified or deleted under watched directories.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories or files to watch. Overrides `[[watch]]` entries.
    ///
    /// Default: the working directory.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Pollwatch.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Scan nested directories recursively.
    #[arg(long)]
    pub all: bool,

    /// Report deleted and moved-away files (prefixed with `!`).
    #[arg(long)]
    pub deletions: bool,

    /// Report absolute paths instead of paths relative to the working directory.
    #[arg(long)]
    pub no_relativize: bool,

    /// Working directory that reported paths are relative to.
    #[arg(long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Listener backend (auto, polling, native).
    #[arg(long, value_name = "KIND")]
    pub backend: Option<BackendKind>,

    /// Poll interval in milliseconds.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Start the baseline this many seconds in the past.
    #[arg(long, value_name = "SECONDS")]
    pub since: Option<u64>,

    /// Glob pattern to ignore (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Poll once, print the changes and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POLLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the effective settings, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
