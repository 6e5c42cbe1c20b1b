// src/watch/options.rs

//! Caller-facing inputs of a listener: what to scan and how.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{PollwatchError, Result};

/// A directory (or single file) to scan on one `modified_files` call.
///
/// Input-only: listeners never store these between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedDirectory {
    pub path: PathBuf,
    /// Include nested directories even when the call is not `all`.
    pub recursive: bool,
}

impl WatchedDirectory {
    /// Shallow entry: direct contents only (or the file itself).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
        }
    }

    pub fn recursive(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
        }
    }

    /// Resolve against `base` when the path is relative.
    pub fn absolute_path(&self, base: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        }
    }
}

impl From<PathBuf> for WatchedDirectory {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for WatchedDirectory {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for WatchedDirectory {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Per-call options of `modified_files`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Scan the full subtree of every directory instead of its direct contents.
    pub all: bool,
}

impl ScanOptions {
    pub fn all() -> Self {
        Self { all: true }
    }
}

/// Construction-time options shared by every listener backend.
#[derive(Debug, Clone)]
pub struct ListenerOptions {
    /// Track deleted (and moved-away) files. Requires `timestamp_files`.
    pub deletions: bool,
    /// Strip the working directory prefix from reported paths.
    pub relativize_paths: bool,
    /// Working directory; defaults to the process current directory.
    pub directory: Option<PathBuf>,
    /// Initial baseline; defaults to the construction instant.
    pub since: Option<SystemTime>,
    /// Glob patterns (relative to the working directory) never reported.
    pub ignore: Vec<String>,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            deletions: false,
            relativize_paths: true,
            directory: None,
            since: None,
            ignore: Vec::new(),
        }
    }
}

impl ListenerOptions {
    /// Absolute working directory: the override (resolved against the
    /// process current directory when relative) or the current directory.
    pub fn working_directory(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(current_dir()?.join(dir)),
            None => current_dir(),
        }
    }

    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    pub fn with_deletions(mut self, deletions: bool) -> Self {
        self.deletions = deletions;
        self
    }

    pub fn with_relativize_paths(mut self, relativize: bool) -> Self {
        self.relativize_paths = relativize;
        self
    }

    pub fn with_since(mut self, since: SystemTime) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| PollwatchError::from_io(".", e))
}
