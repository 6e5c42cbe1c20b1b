// src/watch/relativize.rs

//! Turning absolute scan results into paths relative to the working directory.

use std::path::{Path, PathBuf};

/// Strips the working directory prefix from reported paths.
///
/// When disabled, paths pass through unchanged.
#[derive(Debug, Clone)]
pub struct Relativizer {
    base: PathBuf,
    enabled: bool,
}

impl Relativizer {
    pub fn new(base: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            base: base.into(),
            enabled,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn relativize<I, P>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|p| self.relativize_one(p.as_ref()))
            .collect()
    }

    pub fn relativize_one(&self, path: &Path) -> String {
        if !self.enabled {
            return path.to_string_lossy().into_owned();
        }
        relative_str(&self.base, path).unwrap_or_else(|| path.to_string_lossy().into_owned())
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. `/var` vs `/private/var` on macOS), we canonicalize
///   both paths and try again.
///
/// Returns `None` if the path is not under `root` (or is `root` itself).
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return non_empty(rel);
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return non_empty(rel);
        }
    }

    None
}

fn non_empty(rel: &Path) -> Option<String> {
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}
