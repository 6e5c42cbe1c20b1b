// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{PollwatchError, Result};

pub mod mock;

/// What kind of filesystem entry a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// The subset of metadata the detector cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    /// True when the path itself is a symlink (kind describes the target).
    pub is_symlink: bool,
    pub modified: SystemTime,
}

impl EntryMeta {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Abstract filesystem interface.
///
/// Errors are classified through [`PollwatchError::from_io`] so callers can
/// tell a vanished path from an unreadable one.
pub trait FileSystem: Send + Sync + Debug {
    /// Metadata for `path`, following symlinks.
    fn metadata(&self, path: &Path) -> Result<EntryMeta>;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let meta = fs::metadata(path).map_err(|e| PollwatchError::from_io(path, e))?;
        let is_symlink = fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        let modified = meta
            .modified()
            .map_err(|e| PollwatchError::from_io(path, e))?;
        Ok(EntryMeta {
            kind,
            is_symlink,
            modified,
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| PollwatchError::from_io(path, e))? {
            let entry = entry.map_err(|e| PollwatchError::from_io(path, e))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|e| PollwatchError::from_io(path, e))
    }
}
