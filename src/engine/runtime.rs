// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::Result;

use super::core::CoreSession;
use super::sink::ChangeSink;
use super::EngineEvent;

/// Drives a [`CoreSession`] in response to `EngineEvent`s and hands change
/// sets to a [`ChangeSink`].
///
/// Listener calls do blocking filesystem IO, so each step runs on Tokio's
/// blocking pool; the session moves there and back.
pub struct Runtime<S: ChangeSink> {
    core: Option<CoreSession>,
    event_rx: mpsc::Receiver<EngineEvent>,
    sink: S,
}

impl<S: ChangeSink> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<S: ChangeSink> Runtime<S> {
    pub fn new(core: CoreSession, event_rx: mpsc::Receiver<EngineEvent>, sink: S) -> Self {
        Self {
            core: Some(core),
            event_rx,
            sink,
        }
    }

    /// Main event loop.
    ///
    /// Returns the session so callers (and tests) can inspect it afterwards.
    pub async fn run(mut self) -> Result<CoreSession> {
        info!("pollwatch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let mut core = self
                .core
                .take()
                .ok_or_else(|| anyhow!("core session lost"))?;
            let (core, step) = tokio::task::spawn_blocking(move || {
                let step = core.step(event);
                (core, step)
            })
            .await
            .map_err(|e| anyhow!("poll task failed: {e}"))?;
            self.core = Some(core);

            if let Some(changes) = step.changes {
                self.sink.deliver(&changes)?;
            }

            if !step.keep_running {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        self.core.ok_or_else(|| anyhow!("core session lost").into())
    }
}

/// Emit `EngineEvent::Poll` every `interval` until the channel closes.
pub fn spawn_ticker(tx: mpsc::Sender<EngineEvent>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the session was just started.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if tx.send(EngineEvent::Poll).await.is_err() {
                debug!("ticker channel closed");
                break;
            }
        }
    })
}
