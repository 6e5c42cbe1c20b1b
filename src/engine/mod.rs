// src/engine/mod.rs

//! Driving loop for pollwatch.
//!
//! This module ties together:
//! - a listener backend (polling or native)
//! - the watched directories and scan options
//! - the runtime event loop that reacts to:
//!   - poll ticks
//!   - reload requests
//!   - shutdown signals
//!
//! The synchronous core lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]; change delivery goes through [`sink`].

/// Events flowing into the runtime from the ticker, signals, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Ask the listener for changes since the baseline.
    Poll,
    /// Re-capture the snapshot and move the baseline to now.
    Reload,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    Shutdown,
}

pub mod core;
pub mod runtime;
pub mod sink;

pub use core::{CoreSession, CoreStep};
pub use runtime::{spawn_ticker, Runtime};
pub use sink::{ChangeSink, StdoutSink};
