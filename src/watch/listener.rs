// src/watch/listener.rs

//! Pluggable listener backends.
//!
//! Every backend answers the same question ("which files changed under these
//! directories since the baseline?") with the same [`ChangeSet`] shape, so the
//! engine never needs to know which one it is driving.
//!
//! - [`ChangeDetector`] polls the filesystem and is always available.
//! - [`NativeListener`] buffers kernel events through `notify`.
//!
//! [`select_and_init`] picks one at startup.

use std::fmt;

use tracing::{info, warn};

use crate::errors::Result;
pub use crate::types::BackendKind;
use crate::watch::change_set::ChangeSet;
use crate::watch::detector::ChangeDetector;
use crate::watch::native::NativeListener;
use crate::watch::options::{ListenerOptions, ScanOptions, WatchedDirectory};

/// Contract shared by all listener backends.
pub trait Listener: Send + fmt::Debug {
    /// Changes under `dirs` since the baseline.
    ///
    /// Repeated calls report the same files until
    /// [`update_last_event`](Self::update_last_event) advances the baseline.
    fn modified_files(
        &mut self,
        dirs: &[WatchedDirectory],
        options: ScanOptions,
    ) -> Result<ChangeSet>;

    /// Advance the baseline to now.
    fn update_last_event(&mut self);

    /// Record the current file set of `dirs` so later deletions can be seen.
    ///
    /// An empty `dirs` means the working directory.
    fn timestamp_files(&mut self, dirs: &[WatchedDirectory]) -> Result<()>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the listener for `kind`, probing native support for `Auto`.
pub fn select_and_init(kind: BackendKind, options: ListenerOptions) -> Result<Box<dyn Listener>> {
    let listener: Box<dyn Listener> = match kind {
        BackendKind::Polling => Box::new(ChangeDetector::new(options)?),
        BackendKind::Native => Box::new(NativeListener::new(options)?),
        BackendKind::Auto => {
            if NativeListener::usable() {
                Box::new(NativeListener::new(options)?)
            } else {
                warn!("native file watching unavailable; falling back to polling");
                Box::new(ChangeDetector::new(options)?)
            }
        }
    };

    info!(backend = listener.name(), "listener selected");
    Ok(listener)
}
