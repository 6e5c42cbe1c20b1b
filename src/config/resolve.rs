// src/config/resolve.rs

//! Merge CLI flags over the config file into the effective settings.

use std::time::{Duration, SystemTime};

use tracing::info;

use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::errors::{PollwatchError, Result};
use crate::types::BackendKind;
use crate::watch::{ListenerOptions, ScanOptions, WatchedDirectory};

/// Everything `run` needs, after CLI > config file > defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendKind,
    pub listener: ListenerOptions,
    pub dirs: Vec<WatchedDirectory>,
    pub scan: ScanOptions,
    pub interval: Duration,
    pub once: bool,
}

impl Settings {
    pub fn resolve(args: &CliArgs, cfg: &ConfigFile) -> Result<Self> {
        let section = cfg.listener();

        let mut listener = ListenerOptions {
            deletions: args.deletions || section.deletions,
            relativize_paths: !args.no_relativize && section.relativize_paths,
            directory: args.directory.clone().or_else(|| section.directory.clone()),
            since: None,
            ignore: section.ignore.clone(),
        };
        listener.ignore.extend(args.ignore.iter().cloned());

        if let Some(secs) = args.since {
            let since = SystemTime::now()
                .checked_sub(Duration::from_secs(secs))
                .ok_or_else(|| {
                    PollwatchError::ConfigError(format!("--since {secs} is out of range"))
                })?;
            listener.since = Some(since);
        }

        let interval_ms = args.interval_ms.unwrap_or(section.interval_ms);
        if interval_ms == 0 {
            return Err(PollwatchError::ConfigError(
                "--interval-ms must be >= 1 (got 0)".to_string(),
            ));
        }

        let dirs = if !args.paths.is_empty() {
            args.paths.iter().cloned().map(WatchedDirectory::new).collect()
        } else if !cfg.watch().is_empty() {
            cfg.watched_directories()
        } else {
            vec![WatchedDirectory::new(listener.working_directory()?)]
        };

        let mut backend = args.backend.unwrap_or(section.backend);
        if args.once && backend != BackendKind::Polling {
            // A fresh native listener has no buffered events to report.
            info!("--once uses the polling backend");
            backend = BackendKind::Polling;
        }

        Ok(Self {
            backend,
            listener,
            dirs,
            scan: ScanOptions {
                all: args.all || section.all,
            },
            interval: Duration::from_millis(interval_ms),
            once: args.once,
        })
    }
}
