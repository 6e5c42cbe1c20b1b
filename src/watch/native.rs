// src/watch/native.rs

//! Kernel-event listener on top of `notify`.
//!
//! Instead of scanning, this backend buffers the paths reported by the OS
//! watcher and answers `modified_files` from that buffer, applying the same
//! shallow / `all` scoping and the same `!` deletion marker as the polling
//! detector.
//!
//! With deletion tracking on, a vanished event path is only reported when it
//! was a regular file as of the last `update_last_event` (or when watching
//! started). Directories, and files created and removed between two polls,
//! stay silent, matching what a snapshot diff would see.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, trace, warn};

use crate::errors::{PollwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::change_set::{ChangeSet, ChangedPath};
use crate::watch::ignore::IgnoreSet;
use crate::watch::listener::Listener;
use crate::watch::options::{ListenerOptions, ScanOptions, WatchedDirectory};
use crate::watch::path_index::PathIndex;
use crate::watch::relativize::{relative_str, Relativizer};

pub struct NativeListener {
    watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Result<Event>>,
    fs: Arc<dyn FileSystem>,
    relativizer: Relativizer,
    ignore: IgnoreSet,
    deletions: bool,
    /// Roots registered with the OS watcher, with their canonical form.
    watched: Vec<(PathBuf, PathBuf)>,
    /// Paths seen since the last `update_last_event`.
    pending: BTreeSet<PathBuf>,
    /// Regular files known to exist at the last `update_last_event`; only
    /// maintained when tracking deletions.
    known_files: HashSet<PathBuf>,
}

impl fmt::Debug for NativeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeListener")
            .field("directory", &self.relativizer.base())
            .field("deletions", &self.deletions)
            .field("watched", &self.watched.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl NativeListener {
    /// Probe whether the platform's recommended watcher can be created.
    pub fn usable() -> bool {
        match notify::recommended_watcher(|_res: notify::Result<Event>| {}) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "native watcher probe failed");
                false
            }
        }
    }

    pub fn new(options: ListenerOptions) -> Result<Self> {
        let directory = options.working_directory()?;
        let ignore = IgnoreSet::new(&options.ignore)?;

        let (tx, events) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx)?;

        Ok(Self {
            watcher,
            events,
            fs: Arc::new(RealFileSystem),
            relativizer: Relativizer::new(directory, options.relativize_paths),
            ignore,
            deletions: options.deletions,
            watched: Vec::new(),
            pending: BTreeSet::new(),
            known_files: HashSet::new(),
        })
    }

    fn ensure_watching(&mut self, root: &Path) -> Result<()> {
        if self.watched.iter().any(|(r, _)| r == root) {
            return Ok(());
        }
        let meta = self.fs.metadata(root)?;
        let canonical = self
            .fs
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());

        // File entries are watched through their parent so that replacing the
        // file (write-to-temp + rename) is still observed.
        let (target, mode) = if meta.is_file() {
            (root.parent().unwrap_or(root), RecursiveMode::NonRecursive)
        } else {
            (root, RecursiveMode::Recursive)
        };
        self.watcher.watch(target, mode)?;
        info!(root = ?root, "native watcher started");

        if self.deletions {
            let index = PathIndex::new(Arc::clone(&self.fs));
            self.known_files.extend(index.candidates(root, true)?);
        }

        self.watched.push((root.to_path_buf(), canonical));
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(res) = self.events.try_recv() {
            match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        continue;
                    }
                    trace!(?event, "received notify event");
                    self.pending.extend(event.paths);
                }
                Err(err) => warn!("file watch error: {err}"),
            }
        }
    }

    fn canonical_of(&self, root: &Path) -> Option<&Path> {
        self.watched
            .iter()
            .find(|(r, _)| r == root)
            .map(|(_, c)| c.as_path())
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let rel = relative_str(self.relativizer.base(), path)
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        self.ignore.is_ignored(&rel)
    }
}

/// Whether `path` belongs to the scan of `root`.
fn in_scope(path: &Path, root: &Path, recursive: bool) -> bool {
    if path == root {
        return true;
    }
    if recursive {
        path.starts_with(root)
    } else {
        path.parent() == Some(root)
    }
}

impl Listener for NativeListener {
    fn modified_files(
        &mut self,
        dirs: &[WatchedDirectory],
        options: ScanOptions,
    ) -> Result<ChangeSet> {
        let base = self.relativizer.base().to_path_buf();
        let roots: Vec<(PathBuf, bool)> = dirs
            .iter()
            .map(|d| (d.absolute_path(&base), d.recursive || options.all))
            .collect();

        for (root, _) in &roots {
            self.ensure_watching(root)?;
        }
        self.drain_events();

        let mut changes = ChangeSet::new();
        for path in &self.pending {
            let scoped = roots.iter().any(|(root, recursive)| {
                in_scope(path, root, *recursive)
                    || self
                        .canonical_of(root)
                        .is_some_and(|c| in_scope(path, c, *recursive))
            });
            if !scoped || self.is_ignored(path) {
                continue;
            }

            let change = match self.fs.metadata(path) {
                Ok(meta) if meta.is_file() => {
                    ChangedPath::Existing(self.relativizer.relativize_one(path))
                }
                Ok(_) => continue,
                Err(PollwatchError::NotFound(_))
                    if self.deletions && self.known_files.contains(path) =>
                {
                    ChangedPath::Deleted(self.relativizer.relativize_one(path))
                }
                Err(err) => {
                    trace!(?path, error = %err, "skipping event path");
                    continue;
                }
            };
            changes.insert(change);
        }

        debug!(
            pending = self.pending.len(),
            reported = changes.len(),
            "collected native watcher changes"
        );
        Ok(changes)
    }

    /// Forget everything buffered so far, after refreshing which of the
    /// buffered paths are existing files.
    ///
    /// Mirrors the polling baseline: a change that lands between the last
    /// `modified_files` and this call is not reported.
    fn update_last_event(&mut self) {
        self.drain_events();
        if self.deletions {
            for path in &self.pending {
                match self.fs.metadata(path) {
                    Ok(meta) if meta.is_file() => {
                        self.known_files.insert(path.clone());
                    }
                    _ => {
                        self.known_files.remove(path);
                    }
                }
            }
        }
        self.pending.clear();
    }

    fn timestamp_files(&mut self, dirs: &[WatchedDirectory]) -> Result<()> {
        let base = self.relativizer.base().to_path_buf();
        if dirs.is_empty() {
            return self.ensure_watching(&base);
        }
        for dir in dirs {
            self.ensure_watching(&dir.absolute_path(&base))?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
