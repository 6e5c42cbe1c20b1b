// src/watch/ignore.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{PollwatchError, Result};

/// Compiled ignore patterns, matched against working-directory relative
/// paths such as `"src/main.rs"`.
#[derive(Clone, Default)]
pub struct IgnoreSet {
    set: Option<GlobSet>,
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).map_err(|e| {
                PollwatchError::ConfigError(format!("invalid ignore pattern {pat:?}: {e}"))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| PollwatchError::ConfigError(format!("building ignore set: {e}")))?;

        Ok(Self {
            set: Some(set),
            patterns: patterns.to_vec(),
        })
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.set.as_ref().is_some_and(|s| s.is_match(rel_path))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }
}
