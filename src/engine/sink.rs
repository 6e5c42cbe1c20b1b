// src/engine/sink.rs

//! Pluggable change delivery.
//!
//! The runtime hands every non-empty change set to a `ChangeSink`. This makes
//! it easy to swap in a recording sink in tests while production prints to
//! stdout.

use std::io::{self, Write};

use crate::errors::{PollwatchError, Result};
use crate::watch::ChangeSet;

pub trait ChangeSink: Send {
    fn deliver(&mut self, changes: &ChangeSet) -> Result<()>;
}

/// Prints one path per line; deletions carry the `!` marker.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ChangeSink for StdoutSink {
    fn deliver(&mut self, changes: &ChangeSet) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in changes.to_marked() {
            writeln!(out, "{line}").map_err(|e| PollwatchError::from_io("<stdout>", e))?;
        }
        out.flush()
            .map_err(|e| PollwatchError::from_io("<stdout>", e))
    }
}
