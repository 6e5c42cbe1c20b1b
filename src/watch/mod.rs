// src/watch/mod.rs

//! File change detection.
//!
//! This module is responsible for:
//! - Enumerating files under watched directories (`path_index`).
//! - Recording a path -> mtime snapshot for deletion tracking (`snapshot`).
//! - Diffing scans against the baseline and the snapshot (`detector`).
//! - Turning absolute results into working-directory relative paths
//!   (`relativize`).
//! - Selecting between the polling detector and the `notify` backend
//!   (`listener`, `native`).
//!
//! It does **not** decide what to do with a change set; that is the engine's
//! job.

pub mod change_set;
pub mod detector;
pub mod ignore;
pub mod listener;
pub mod native;
pub mod options;
pub mod path_index;
pub mod relativize;
pub mod snapshot;

pub use change_set::{ChangeSet, ChangedPath, DELETED_MARKER};
pub use detector::ChangeDetector;
pub use listener::{select_and_init, BackendKind, Listener};
pub use native::NativeListener;
pub use options::{ListenerOptions, ScanOptions, WatchedDirectory};
pub use path_index::PathIndex;
pub use relativize::Relativizer;
pub use snapshot::SnapshotStore;
