// src/fs/mock.rs

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::{EntryKind, EntryMeta, FileSystem};
use crate::errors::{PollwatchError, Result};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths that fail every access with `PermissionDenied`.
    denied: HashSet<PathBuf>,
    /// Paths still listed by their parent but gone by the time they are stat'ed.
    vanished: HashSet<PathBuf>,
}

/// In-memory filesystem for deterministic tests of enumeration and races.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .insert(path.clone(), MockEntry::File { modified });
        Self::link_into_parent(&mut state.entries, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        Self::ensure_dir_entry(&mut state.entries, &path);
    }

    /// Update the mtime of an existing file; no-op for unknown paths.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File { modified: m }) = state.entries.get_mut(path.as_ref()) {
            *m = modified;
        }
    }

    /// Remove a file or an empty directory and unlink it from its parent.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        state.entries.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let parent = normalize_parent(parent);
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
                children.retain(|c| c.as_str() != name.to_string_lossy());
            }
        }
    }

    /// Make every access to `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.denied.insert(path.as_ref().to_path_buf());
    }

    /// Keep `path` listed in its parent but fail `metadata` with `NotFound`,
    /// as if it was deleted between `read_dir` and `stat`.
    pub fn vanish_on_stat(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.vanished.insert(path.as_ref().to_path_buf());
    }

    fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if let Some(parent) = path.parent() {
            let parent = normalize_parent(parent);
            if parent == path {
                return;
            }
            Self::ensure_dir_entry(entries, parent);
            if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if !children.iter().any(|c| c == name) {
                        children.push(name.to_string());
                    }
                }
            }
        }
    }

    fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if !entries.contains_key(path) {
            entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(entries, path);
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn denied(path: &Path) -> PollwatchError {
    PollwatchError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied))
}

fn missing(path: &Path) -> PollwatchError {
    PollwatchError::from_io(path, io::Error::from(io::ErrorKind::NotFound))
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let state = self.state.lock().unwrap();
        if state.denied.contains(path) {
            return Err(denied(path));
        }
        if state.vanished.contains(path) {
            return Err(missing(path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { modified }) => Ok(EntryMeta {
                kind: EntryKind::File,
                is_symlink: false,
                modified: *modified,
            }),
            Some(MockEntry::Dir(_)) => Ok(EntryMeta {
                kind: EntryKind::Dir,
                is_symlink: false,
                modified: SystemTime::UNIX_EPOCH,
            }),
            None => Err(missing(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        if state.denied.contains(path) {
            return Err(denied(path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            Some(MockEntry::File { .. }) => Err(PollwatchError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("not a directory"),
            }),
            None => Err(missing(path)),
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        Ok(path.to_path_buf())
    }
}
