// src/watch/path_index.rs

//! Enumeration of regular files under watched roots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{PollwatchError, Result};
use crate::fs::FileSystem;

/// Enumerates regular files, hidden entries included.
///
/// Symlinked directories are not descended into, so a symlink cycle cannot
/// make a walk infinite. Symlinks to regular files are reported as files.
#[derive(Debug, Clone)]
pub struct PathIndex {
    fs: Arc<dyn FileSystem>,
}

impl PathIndex {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// All regular files under `root`, recursively.
    ///
    /// Fails with `NotFound` / `PermissionDenied` when `root` itself cannot be
    /// read. Permission errors in nested directories propagate too; a nested
    /// directory that disappears mid-walk is skipped.
    pub fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if err.is_not_found() && dir != root => {
                    trace!(?dir, "directory vanished during walk; skipping");
                    continue;
                }
                Err(err) => return Err(err),
            };

            for path in entries {
                match self.fs.metadata(&path) {
                    Ok(meta) if meta.is_dir() && !meta.is_symlink => stack.push(path),
                    Ok(meta) if meta.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(err) if err.is_not_found() => {
                        trace!(?path, "entry vanished during walk; skipping");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        debug!(?root, count = files.len(), "enumerated files");
        Ok(files)
    }

    /// Candidate files for one watched entry.
    ///
    /// - A file entry yields itself.
    /// - A directory yields its direct regular files, or the full subtree when
    ///   `recursive` is set.
    pub fn candidates(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        let meta = self.fs.metadata(root)?;

        if meta.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !meta.is_dir() {
            return Err(PollwatchError::NotFound(root.to_path_buf()));
        }
        if recursive {
            return self.enumerate(root);
        }

        let mut files = Vec::new();
        for path in self.fs.read_dir(root)? {
            match self.fs.metadata(&path) {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    trace!(?path, "entry vanished during shallow scan; skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(files)
    }
}
