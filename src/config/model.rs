// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::watch::{BackendKind, WatchedDirectory};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [listener]
/// backend = "auto"
/// deletions = true
/// interval_ms = 500
/// ignore = ["**/*.swp"]
///
/// [[watch]]
/// path = "src"
/// recursive = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub listener: ListenerSection,

    /// Directories (or single files) to watch, from `[[watch]]`.
    #[serde(default)]
    pub watch: Vec<WatchEntry>,
}

/// `[listener]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSection {
    /// `"auto"`, `"polling"` or `"native"`.
    #[serde(default)]
    pub backend: BackendKind,

    /// Report deleted and moved-away files with a `!` marker.
    #[serde(default)]
    pub deletions: bool,

    /// Report paths relative to `directory` (default true).
    #[serde(default = "default_relativize_paths")]
    pub relativize_paths: bool,

    /// Working directory override; defaults to the process current directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Poll interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Scan every watched directory recursively.
    #[serde(default)]
    pub all: bool,

    /// Glob patterns, relative to `directory`, that are never reported.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_relativize_paths() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    500
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            deletions: false,
            relativize_paths: default_relativize_paths(),
            directory: None,
            interval_ms: default_interval_ms(),
            all: false,
            ignore: Vec::new(),
        }
    }
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchEntry {
    pub path: PathBuf,

    #[serde(default)]
    pub recursive: bool,
}

impl From<&WatchEntry> for WatchedDirectory {
    fn from(entry: &WatchEntry) -> Self {
        WatchedDirectory {
            path: entry.path.clone(),
            recursive: entry.recursive,
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, which runs the
/// checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    listener: ListenerSection,
    watch: Vec<WatchEntry>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(listener: ListenerSection, watch: Vec<WatchEntry>) -> Self {
        Self { listener, watch }
    }

    pub fn listener(&self) -> &ListenerSection {
        &self.listener
    }

    pub fn watch(&self) -> &[WatchEntry] {
        &self.watch
    }

    pub fn watched_directories(&self) -> Vec<WatchedDirectory> {
        self.watch.iter().map(WatchedDirectory::from).collect()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ListenerSection::default(), Vec::new())
    }
}
