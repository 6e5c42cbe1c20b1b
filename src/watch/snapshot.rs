// src/watch/snapshot.rs

//! Path -> mtime record used as the comparison base for deletion tracking.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::errors::Result;
use crate::watch::path_index::PathIndex;

/// Full file set known to exist as of the last capture.
///
/// `capture` replaces the whole record. Between captures the detector only
/// drops paths it reported deleted and upserts paths it reported existing.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: HashMap<PathBuf, SystemTime>,
    captured: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the snapshot from every file under `roots`, recursively. A
    /// root that is a file records just that file.
    ///
    /// On error the previous snapshot is left untouched.
    pub fn capture(&mut self, index: &PathIndex, roots: &[PathBuf]) -> Result<usize> {
        let mut entries = HashMap::new();

        for root in roots {
            for path in index.candidates(root, true)? {
                match index.fs().metadata(&path) {
                    Ok(meta) => {
                        entries.insert(path, meta.modified);
                    }
                    Err(err) => {
                        trace!(?path, error = %err, "file vanished during capture; skipping");
                    }
                }
            }
        }

        let count = entries.len();
        self.entries = entries;
        self.captured = true;
        debug!(count, "captured file snapshot");
        Ok(count)
    }

    /// Every recorded path absent from `current_paths`.
    pub fn diff_against(&self, current_paths: &HashSet<PathBuf>) -> BTreeSet<PathBuf> {
        self.entries
            .keys()
            .filter(|path| !current_paths.contains(*path))
            .cloned()
            .collect()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn record(&mut self, path: PathBuf, modified: SystemTime) {
        self.entries.insert(path, modified);
    }

    pub fn forget(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
