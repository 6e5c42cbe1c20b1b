// src/engine/core.rs

//! Synchronous core session.
//!
//! The core owns one [`Listener`] plus the scope it is asked about, and turns
//! [`EngineEvent`]s into change sets. It has no channels and no Tokio types;
//! the async shell (`engine::runtime::Runtime`) is responsible for reading
//! events and delivering results.

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::watch::{ChangeSet, Listener, ScanOptions, WatchedDirectory};

use super::EngineEvent;

/// Decision returned by the core after handling a single `EngineEvent`.
#[derive(Debug, Clone, Default)]
pub struct CoreStep {
    /// Non-empty changes the shell should deliver.
    pub changes: Option<ChangeSet>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn idle() -> Self {
        Self {
            changes: None,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct CoreSession {
    listener: Box<dyn Listener>,
    dirs: Vec<WatchedDirectory>,
    scan: ScanOptions,
    deletions: bool,
}

impl CoreSession {
    pub fn new(
        listener: Box<dyn Listener>,
        dirs: Vec<WatchedDirectory>,
        scan: ScanOptions,
        deletions: bool,
    ) -> Self {
        Self {
            listener,
            dirs,
            scan,
            deletions,
        }
    }

    pub fn listener(&self) -> &dyn Listener {
        self.listener.as_ref()
    }

    pub fn dirs(&self) -> &[WatchedDirectory] {
        &self.dirs
    }

    /// Take the initial snapshot when tracking deletions. The baseline was
    /// already set when the listener was built. Errors here are fatal: the
    /// watch scope is wrong.
    pub fn start(&mut self) -> Result<()> {
        if self.deletions {
            self.listener.timestamp_files(&self.dirs)?;
        }
        info!(
            backend = self.listener.name(),
            dirs = self.dirs.len(),
            all = self.scan.all,
            deletions = self.deletions,
            "watch session started"
        );
        Ok(())
    }

    /// Handle a single event.
    ///
    /// A failed poll is logged and skipped without advancing the baseline, so
    /// the next successful poll still reports everything since the last one.
    pub fn step(&mut self, event: EngineEvent) -> CoreStep {
        match event {
            EngineEvent::Poll => match self.poll() {
                Ok(changes) if changes.is_empty() => CoreStep::idle(),
                Ok(changes) => CoreStep {
                    changes: Some(changes),
                    keep_running: true,
                },
                Err(err) => {
                    warn!(error = %err, "poll failed; skipping this cycle");
                    CoreStep::idle()
                }
            },
            EngineEvent::Reload => {
                if let Err(err) = self.reload() {
                    warn!(error = %err, "reload failed");
                }
                CoreStep::idle()
            }
            EngineEvent::Shutdown => CoreStep {
                changes: None,
                keep_running: false,
            },
        }
    }

    fn poll(&mut self) -> Result<ChangeSet> {
        let changes = self.listener.modified_files(&self.dirs, self.scan)?;
        self.listener.update_last_event();
        debug!(count = changes.len(), "poll complete");
        Ok(changes)
    }

    fn reload(&mut self) -> Result<()> {
        if self.deletions {
            self.listener.timestamp_files(&self.dirs)?;
        }
        self.listener.update_last_event();
        info!("session reloaded");
        Ok(())
    }
}
