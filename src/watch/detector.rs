// src/watch/detector.rs

//! Polling change detector.
//!
//! A file is reported as modified iff its mtime is strictly greater than the
//! baseline (`last_event`). A file stamped at or before the baseline counts as
//! unchanged. The baseline comes from the fine-grained wall clock, while the
//! kernel stamps mtimes from a coarse clock (one timer tick, 1-10 ms on Linux;
//! whole seconds on FAT or HFS+). A write landing within one tick after
//! `update_last_event` can therefore carry an mtime at or before the baseline
//! and be missed. The minimum reliable polling interval is one kernel
//! timestamp tick of the watched filesystem.
//!
//! With deletion tracking on, the detector also diffs the current file set
//! against the snapshot taken by [`ChangeDetector::timestamp_files`]:
//!
//! - a snapshot path that is gone is reported with the `!` marker;
//! - a scanned file unknown to the snapshot whose file name matches one of
//!   those gone paths is reported as existing, whatever its mtime.
//!
//! The second rule is how a move shows up as a delete + create pair. It is
//! purely name based: there is no inode or content identity check.
//!
//! A watched root that does not exist aborts the call with `NotFound`, except
//! for a single-file entry that has been seen before (as a file root of an
//! earlier scan, or in the snapshot). Such an entry scans as empty: with
//! tracking on its snapshot entry turns into a deletion, with tracking off it
//! is silently absent. A never-seen missing path still fails fast, since it
//! cannot be told apart from a misconfigured directory.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::change_set::{ChangeSet, ChangedPath};
use crate::watch::ignore::IgnoreSet;
use crate::watch::listener::Listener;
use crate::watch::options::{ListenerOptions, ScanOptions, WatchedDirectory};
use crate::watch::path_index::PathIndex;
use crate::watch::relativize::{relative_str, Relativizer};
use crate::watch::snapshot::SnapshotStore;

/// Polling implementation of [`Listener`].
///
/// Owns the baseline and the snapshot; one instance per watch session.
/// Not meant to be shared: callers polling from several threads must
/// serialize access themselves.
#[derive(Debug)]
pub struct ChangeDetector {
    index: PathIndex,
    relativizer: Relativizer,
    ignore: IgnoreSet,
    snapshot: SnapshotStore,
    deletions: bool,
    last_event: SystemTime,
    warned_uncaptured: bool,
    /// Roots observed to be single files.
    file_entries: HashSet<PathBuf>,
}

impl ChangeDetector {
    /// Detector over the real filesystem.
    pub fn new(options: ListenerOptions) -> Result<Self> {
        Self::with_fs(Arc::new(RealFileSystem), options)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, options: ListenerOptions) -> Result<Self> {
        let directory = options.working_directory()?;
        let ignore = IgnoreSet::new(&options.ignore)?;

        debug!(
            ?directory,
            deletions = options.deletions,
            relativize = options.relativize_paths,
            "creating polling change detector"
        );

        Ok(Self {
            index: PathIndex::new(fs),
            relativizer: Relativizer::new(directory, options.relativize_paths),
            ignore,
            snapshot: SnapshotStore::new(),
            deletions: options.deletions,
            last_event: options.since.unwrap_or_else(SystemTime::now),
            warned_uncaptured: false,
            file_entries: HashSet::new(),
        })
    }

    /// Working directory results are relative to.
    pub fn directory(&self) -> &Path {
        self.relativizer.base()
    }

    pub fn last_event(&self) -> SystemTime {
        self.last_event
    }

    pub fn watches_deletions(&self) -> bool {
        self.deletions
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    /// Every regular file under the working directory.
    pub fn all_files(&self) -> Result<Vec<PathBuf>> {
        self.index.enumerate(self.directory())
    }

    pub fn relativize_paths<I, P>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.relativizer.relativize(paths)
    }

    /// Move the baseline to now. It never moves backwards.
    pub fn update_last_event(&mut self) {
        let now = SystemTime::now();
        if now > self.last_event {
            self.last_event = now;
        }
    }

    /// Rebuild the snapshot from `dirs` (the working directory when empty).
    pub fn timestamp_files(&mut self, dirs: &[WatchedDirectory]) -> Result<()> {
        let roots: Vec<PathBuf> = if dirs.is_empty() {
            vec![self.directory().to_path_buf()]
        } else {
            dirs.iter()
                .map(|d| d.absolute_path(self.directory()))
                .collect()
        };
        self.snapshot.capture(&self.index, &roots)?;
        for root in roots {
            if self.snapshot.contains(&root) {
                self.file_entries.insert(root);
            }
        }
        Ok(())
    }

    /// Files under `dirs` changed since the baseline, plus deletions when
    /// tracking is on.
    ///
    /// A missing or unreadable directory aborts the whole call. A file that
    /// disappears between listing and stat is silently left out, and so does
    /// a single-file entry that was seen before.
    pub fn modified_files(
        &mut self,
        dirs: &[WatchedDirectory],
        options: ScanOptions,
    ) -> Result<ChangeSet> {
        let baseline = self.last_event;
        let roots: Vec<(PathBuf, bool)> = dirs
            .iter()
            .map(|d| (d.absolute_path(self.directory()), d.recursive || options.all))
            .collect();

        let mut candidates = BTreeSet::new();
        for (root, recursive) in &roots {
            candidates.extend(self.scan_root(root, *recursive)?);
        }

        let mut stamps: HashMap<PathBuf, SystemTime> = HashMap::with_capacity(candidates.len());
        let mut existing = BTreeSet::new();
        for path in candidates {
            if self.is_ignored(&path) {
                continue;
            }
            let modified = match self.index.fs().metadata(&path) {
                Ok(meta) => meta.modified,
                Err(err) => {
                    trace!(?path, error = %err, "candidate vanished before stat; skipping");
                    continue;
                }
            };
            if modified > baseline {
                existing.insert(path.clone());
            }
            stamps.insert(path, modified);
        }

        let deleted = if self.deletions {
            self.track_deletions(&roots, &stamps, &mut existing)?
        } else {
            BTreeSet::new()
        };

        debug!(
            dirs = roots.len(),
            scanned = stamps.len(),
            existing = existing.len(),
            deleted = deleted.len(),
            "polled for modified files"
        );

        let mut changes = ChangeSet::new();
        for path in &existing {
            changes.insert(ChangedPath::Existing(self.relativizer.relativize_one(path)));
        }
        for path in &deleted {
            changes.insert(ChangedPath::Deleted(self.relativizer.relativize_one(path)));
        }
        Ok(changes)
    }

    /// Diff the snapshot against the full current file set of `roots`, pair
    /// deletions with same-named unknown files, then reconcile the snapshot
    /// with what is about to be reported.
    fn track_deletions(
        &mut self,
        roots: &[(PathBuf, bool)],
        stamps: &HashMap<PathBuf, SystemTime>,
        existing: &mut BTreeSet<PathBuf>,
    ) -> Result<BTreeSet<PathBuf>> {
        if !self.snapshot.is_captured() && !self.warned_uncaptured {
            warn!("deletion tracking is on but no snapshot was taken; deletions cannot be reported yet");
            self.warned_uncaptured = true;
        }

        let mut current = HashSet::new();
        for (root, _) in roots {
            current.extend(self.scan_root(root, true)?);
        }

        let deleted: BTreeSet<PathBuf> = self
            .snapshot
            .diff_against(&current)
            .into_iter()
            .filter(|path| roots.iter().any(|(root, _)| path.starts_with(root)))
            .filter(|path| !self.is_ignored(path))
            .collect();

        let gone_names: HashSet<&OsStr> = deleted.iter().filter_map(|p| p.file_name()).collect();
        for path in stamps.keys() {
            let moved_here = !self.snapshot.contains(path)
                && path.file_name().is_some_and(|n| gone_names.contains(n));
            if moved_here {
                trace!(?path, "unknown file matches a deleted name; reporting as created");
                existing.insert(path.clone());
            }
        }

        for path in &deleted {
            self.snapshot.forget(path);
        }
        if self.snapshot.is_captured() {
            for path in existing.iter() {
                if let Some(modified) = stamps.get(path) {
                    self.snapshot.record(path.clone(), *modified);
                }
            }
        }

        Ok(deleted)
    }

    /// Candidates of one root; a known single-file entry that is gone scans
    /// as empty instead of failing.
    fn scan_root(&mut self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        match self.index.candidates(root, recursive) {
            Ok(files) => {
                if files.len() == 1 && files[0] == root {
                    self.file_entries.insert(root.to_path_buf());
                }
                Ok(files)
            }
            Err(err)
                if err.is_not_found()
                    && (self.file_entries.contains(root) || self.snapshot.contains(root)) =>
            {
                trace!(?root, "watched file is gone; scanning as empty");
                self.file_entries.insert(root.to_path_buf());
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let rel = relative_str(self.directory(), path)
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        self.ignore.is_ignored(&rel)
    }
}

impl Listener for ChangeDetector {
    fn modified_files(
        &mut self,
        dirs: &[WatchedDirectory],
        options: ScanOptions,
    ) -> Result<ChangeSet> {
        ChangeDetector::modified_files(self, dirs, options)
    }

    fn update_last_event(&mut self) {
        ChangeDetector::update_last_event(self)
    }

    fn timestamp_files(&mut self, dirs: &[WatchedDirectory]) -> Result<()> {
        ChangeDetector::timestamp_files(self, dirs)
    }

    fn name(&self) -> &'static str {
        "polling"
    }
}
