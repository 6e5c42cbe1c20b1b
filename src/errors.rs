// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollwatchError {
    /// A watched directory (or explicitly listed file) does not exist.
    #[error("Path not found: {0:?}")]
    NotFound(PathBuf),

    /// A watched directory or file could not be read.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Native watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PollwatchError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => PollwatchError::NotFound(path),
            io::ErrorKind::PermissionDenied => PollwatchError::PermissionDenied(path),
            _ => PollwatchError::Io { path, source: err },
        }
    }

    /// True for the "file is gone" class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PollwatchError::NotFound(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PollwatchError>;
