use std::error::Error;
use std::time::Duration;

use pollwatch::engine::{spawn_ticker, CoreSession, EngineEvent, Runtime};
use pollwatch::watch::{
    select_and_init, BackendKind, ChangeDetector, ListenerOptions, ScanOptions, WatchedDirectory,
};
use pollwatch_test_utils::{init_tracing, settle, with_timeout, FixtureTree, RecordingSink};
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

fn session(tree: &FixtureTree, deletions: bool) -> Result<CoreSession, Box<dyn Error>> {
    let detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_deletions(deletions),
    )?;
    let mut core = CoreSession::new(
        Box::new(detector),
        vec![WatchedDirectory::from("folder1")],
        ScanOptions::default(),
        deletions,
    );
    core.start()?;
    Ok(core)
}

#[test]
fn poll_reports_changes_once() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let mut core = session(&tree, false)?;
    settle();

    let step = core.step(EngineEvent::Poll);
    assert!(step.keep_running);
    assert!(step.changes.is_none());

    settle();
    tree.touch("folder1/file1.txt")?;
    let step = core.step(EngineEvent::Poll);
    let changes = step.changes.expect("touched file is reported");
    assert_eq!(changes.to_marked(), vec!["folder1/file1.txt"]);

    let step = core.step(EngineEvent::Poll);
    assert!(step.changes.is_none(), "change reported twice");
    Ok(())
}

#[test]
fn failed_poll_is_skipped_and_retried() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let detector = ChangeDetector::new(ListenerOptions::in_directory(tree.root()))?;
    let mut core = CoreSession::new(
        Box::new(detector),
        vec![WatchedDirectory::from("later")],
        ScanOptions::default(),
        false,
    );
    core.start()?;
    settle();

    let step = core.step(EngineEvent::Poll);
    assert!(step.keep_running);
    assert!(step.changes.is_none());

    // The failed poll did not advance the baseline.
    tree.write("later/new.txt", "x")?;
    let step = core.step(EngineEvent::Poll);
    let changes = step.changes.expect("file created after the failure is reported");
    assert_eq!(changes.to_marked(), vec!["later/new.txt"]);
    Ok(())
}

#[test]
fn start_reports_bad_scope_for_deletions() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_deletions(true),
    )?;
    let mut core = CoreSession::new(
        Box::new(detector),
        vec![WatchedDirectory::from("missing")],
        ScanOptions::default(),
        true,
    );
    assert!(core.start().is_err());
    Ok(())
}

#[test]
fn reload_recaptures_the_snapshot() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let mut core = session(&tree, true)?;

    tree.remove("folder1/deletedfile1.txt")?;
    let step = core.step(EngineEvent::Reload);
    assert!(step.keep_running);
    assert!(step.changes.is_none());

    // Deleted before the reload, so no longer a change.
    let step = core.step(EngineEvent::Poll);
    assert!(step.changes.is_none(), "unexpected: {:?}", step.changes);

    tree.remove("folder1/file1.txt")?;
    let step = core.step(EngineEvent::Poll);
    let changes = step.changes.expect("deletion after reload is reported");
    assert_eq!(changes.to_marked(), vec!["!folder1/file1.txt"]);
    Ok(())
}

#[test]
fn shutdown_stops_the_loop() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let mut core = session(&tree, false)?;

    let step = core.step(EngineEvent::Shutdown);
    assert!(!step.keep_running);
    assert!(step.changes.is_none());
    Ok(())
}

#[test]
fn session_exposes_listener_and_scope() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let listener = select_and_init(
        BackendKind::Polling,
        ListenerOptions::in_directory(tree.root()),
    )?;
    let core = CoreSession::new(
        listener,
        vec![WatchedDirectory::from("folder1")],
        ScanOptions::all(),
        false,
    );
    assert_eq!(core.listener().name(), "polling");
    assert_eq!(core.dirs().len(), 1);
    Ok(())
}

#[tokio::test]
async fn runtime_delivers_to_sink() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let core = session(&tree, true)?;
    settle();

    tree.touch("folder1/file1.txt")?;
    tree.remove("folder1/deletedfile1.txt")?;

    let (tx, rx) = mpsc::channel(8);
    let sink = RecordingSink::new();
    let delivered = sink.delivered();

    tx.send(EngineEvent::Poll).await?;
    tx.send(EngineEvent::Poll).await?;
    tx.send(EngineEvent::Shutdown).await?;
    // Never reached: the loop stops at shutdown.
    tx.send(EngineEvent::Poll).await?;

    let core = with_timeout(Runtime::new(core, rx, sink).run()).await?;
    assert_eq!(core.dirs().len(), 1);

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1, "only non-empty polls are delivered");
    assert_eq!(
        delivered[0].to_marked(),
        vec!["!folder1/deletedfile1.txt", "folder1/file1.txt"]
    );
    Ok(())
}

#[tokio::test]
async fn runtime_exits_when_channel_closes() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let core = session(&tree, false)?;

    let (tx, rx) = mpsc::channel(8);
    tx.send(EngineEvent::Poll).await?;
    drop(tx);

    let sink = RecordingSink::new();
    let delivered = sink.delivered();
    with_timeout(Runtime::new(core, rx, sink).run()).await?;
    assert!(delivered.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn ticker_drives_polls() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let core = session(&tree, false)?;
    settle();
    tree.touch("folder1/file1.txt")?;

    let (tx, rx) = mpsc::channel(8);
    let ticker = spawn_ticker(tx.clone(), Duration::from_millis(10));
    let sink = RecordingSink::new();
    let delivered = sink.delivered();
    let runtime = tokio::spawn(Runtime::new(core, rx, sink).run());

    with_timeout(async {
        loop {
            if !delivered.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    tx.send(EngineEvent::Shutdown).await?;
    with_timeout(runtime).await??;
    ticker.abort();

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered[0].to_marked(), vec!["folder1/file1.txt"]);
    Ok(())
}
