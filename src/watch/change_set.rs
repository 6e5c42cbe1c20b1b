// src/watch/change_set.rs

use std::collections::BTreeSet;
use std::fmt;

/// Leading marker on a reported path that no longer exists.
pub const DELETED_MARKER: char = '!';

/// One reported path, tagged with whether it still exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangedPath {
    /// Created or modified since the baseline.
    Existing(String),
    /// Deleted or moved away since the snapshot.
    Deleted(String),
}

impl ChangedPath {
    pub fn path(&self) -> &str {
        match self {
            ChangedPath::Existing(p) | ChangedPath::Deleted(p) => p,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, ChangedPath::Existing(_))
    }

    /// Parse the marked string form (`"!path"` for deletions).
    pub fn parse_marked(s: &str) -> Self {
        match s.strip_prefix(DELETED_MARKER) {
            Some(rest) => ChangedPath::Deleted(rest.to_string()),
            None => ChangedPath::Existing(s.to_string()),
        }
    }
}

impl fmt::Display for ChangedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangedPath::Existing(p) => f.write_str(p),
            ChangedPath::Deleted(p) => write!(f, "{DELETED_MARKER}{p}"),
        }
    }
}

/// Result of one poll: paths that changed and paths that went away.
///
/// Both halves are sets, so duplicates collapse and iteration order is
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub existing: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.existing.len() + self.deleted.len()
    }

    pub fn insert(&mut self, change: ChangedPath) -> bool {
        match change {
            ChangedPath::Existing(p) => self.existing.insert(p),
            ChangedPath::Deleted(p) => self.deleted.insert(p),
        }
    }

    /// Deletions first, then existing paths, each half sorted.
    pub fn iter(&self) -> impl Iterator<Item = ChangedPath> + '_ {
        self.deleted
            .iter()
            .map(|p| ChangedPath::Deleted(p.clone()))
            .chain(self.existing.iter().map(|p| ChangedPath::Existing(p.clone())))
    }

    /// Flat string form with deletions prefixed by [`DELETED_MARKER`].
    pub fn to_marked(&self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }

    /// Same as [`to_marked`](Self::to_marked) but as a set, for
    /// order-independent comparisons.
    pub fn marked_set(&self) -> BTreeSet<String> {
        self.iter().map(|c| c.to_string()).collect()
    }

    pub fn merge(&mut self, other: ChangeSet) {
        self.existing.extend(other.existing);
        self.deleted.extend(other.deleted);
    }
}

impl FromIterator<ChangedPath> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = ChangedPath>>(iter: T) -> Self {
        let mut set = ChangeSet::new();
        for change in iter {
            set.insert(change);
        }
        set
    }
}
