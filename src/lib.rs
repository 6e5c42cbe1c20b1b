// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_or_default, Settings};
use crate::engine::{spawn_ticker, CoreSession, EngineEvent, Runtime, StdoutSink};
use crate::watch::select_and_init;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - listener backend selection
/// - the poll ticker (or a single poll for `--once`)
/// - Ctrl-C / SIGHUP handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &cfg)?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let listener = select_and_init(settings.backend, settings.listener.clone())?;
    let mut core = CoreSession::new(
        listener,
        settings.dirs.clone(),
        settings.scan,
        settings.listener.deletions,
    );
    core.start()?;

    let (tx, rx) = mpsc::channel::<EngineEvent>(16);

    if settings.once {
        tx.send(EngineEvent::Poll).await?;
        tx.send(EngineEvent::Shutdown).await?;
    } else {
        spawn_ticker(tx.clone(), settings.interval);
        spawn_signal_handlers(tx.clone());
        info!(interval = ?settings.interval, "polling for changes");
    }
    drop(tx);

    let runtime = Runtime::new(core, rx, StdoutSink);
    runtime.run().await?;
    Ok(())
}

/// Ctrl-C → shutdown; SIGHUP → reload (unix only).
fn spawn_signal_handlers(tx: mpsc::Sender<EngineEvent>) {
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(EngineEvent::Shutdown).await;
        });
    }

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to listen for SIGHUP: {e}");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            if tx.send(EngineEvent::Reload).await.is_err() {
                break;
            }
        }
    });
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(settings: &Settings) {
    println!("pollwatch dry-run");
    println!("  backend = {:?}", settings.backend);
    println!("  deletions = {}", settings.listener.deletions);
    println!("  relativize_paths = {}", settings.listener.relativize_paths);
    if let Some(ref dir) = settings.listener.directory {
        println!("  directory = {}", dir.display());
    }
    println!("  interval = {:?}", settings.interval);
    println!("  all = {}", settings.scan.all);
    if !settings.listener.ignore.is_empty() {
        println!("  ignore = {:?}", settings.listener.ignore);
    }
    println!();

    println!("watch ({}):", settings.dirs.len());
    for dir in &settings.dirs {
        if dir.recursive {
            println!("  - {} (recursive)", dir.path.display());
        } else {
            println!("  - {}", dir.path.display());
        }
    }

    debug!("dry-run complete (no watching)");
}
