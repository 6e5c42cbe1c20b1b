//! Failure paths of the polling detector, driven through the in-memory
//! filesystem.

use std::collections::BTreeSet;
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pollwatch::errors::PollwatchError;
use pollwatch::fs::mock::MockFileSystem;
use pollwatch::watch::{ChangeDetector, ListenerOptions, ScanOptions, WatchedDirectory};
use pollwatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// `/w` with one old and one fresh file per folder, and a detector whose
/// baseline sits between the two.
fn setup(deletions: bool) -> Result<(MockFileSystem, ChangeDetector), Box<dyn Error>> {
    init_tracing();
    let baseline = SystemTime::now() - Duration::from_secs(60);
    let old = baseline - Duration::from_secs(60);
    let fresh = baseline + Duration::from_secs(30);

    let fs = MockFileSystem::new();
    fs.add_file("/w/a/old.txt", old);
    fs.add_file("/w/a/new.txt", fresh);
    fs.add_file("/w/b/old.txt", old);
    fs.add_file("/w/b/new.txt", fresh);

    let detector = ChangeDetector::with_fs(
        Arc::new(fs.clone()),
        ListenerOptions::in_directory("/w")
            .with_since(baseline)
            .with_deletions(deletions),
    )?;
    Ok((fs, detector))
}

#[test]
fn since_sets_the_initial_baseline() -> TestResult {
    let (_fs, mut detector) = setup(false)?;

    let changes = detector.modified_files(
        &[WatchedDirectory::from("a"), WatchedDirectory::from("b")],
        ScanOptions::default(),
    )?;
    assert_eq!(changes.marked_set(), set(&["a/new.txt", "b/new.txt"]));
    Ok(())
}

#[test]
fn missing_directory_aborts_the_whole_call() {
    let (_fs, mut detector) = setup(false).expect("setup");

    let err = detector
        .modified_files(
            &[WatchedDirectory::from("a"), WatchedDirectory::from("missing")],
            ScanOptions::default(),
        )
        .expect_err("missing directory must fail");
    assert!(matches!(err, PollwatchError::NotFound(_)), "got {err:?}");
}

#[test]
fn unreadable_directory_is_permission_denied() {
    let (fs, mut detector) = setup(false).expect("setup");
    fs.deny("/w/b");

    let err = detector
        .modified_files(&[WatchedDirectory::from("b")], ScanOptions::default())
        .expect_err("denied directory must fail");
    assert!(matches!(err, PollwatchError::PermissionDenied(_)), "got {err:?}");
}

#[test]
fn file_vanishing_before_stat_is_left_out() -> TestResult {
    let (fs, mut detector) = setup(false)?;
    fs.vanish_on_stat("/w/a/new.txt");

    let changes = detector.modified_files(&[WatchedDirectory::from("a")], ScanOptions::default())?;
    assert!(changes.is_empty(), "unexpected changes: {changes:?}");
    Ok(())
}

#[test]
fn failed_call_keeps_the_baseline() {
    let (_fs, mut detector) = setup(false).expect("setup");
    let before = detector.last_event();

    let _ = detector.modified_files(&[WatchedDirectory::from("missing")], ScanOptions::default());
    assert_eq!(detector.last_event(), before);
}

#[test]
fn failed_capture_keeps_previous_snapshot() -> TestResult {
    let (fs, mut detector) = setup(true)?;
    detector.timestamp_files(&[])?;
    assert_eq!(detector.snapshot().len(), 4);

    fs.deny("/w/b");
    let err = detector
        .timestamp_files(&[])
        .expect_err("capture over a denied directory must fail");
    assert!(matches!(err, PollwatchError::PermissionDenied(_)));
    assert_eq!(detector.snapshot().len(), 4);
    Ok(())
}

#[test]
fn mock_deletions_are_marked() -> TestResult {
    let (fs, mut detector) = setup(true)?;
    detector.timestamp_files(&[])?;

    fs.remove("/w/a/old.txt");
    let changes = detector.modified_files(&[WatchedDirectory::from("a")], ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["!a/old.txt", "a/new.txt"]));
    assert_eq!(changes.to_marked(), vec!["!a/old.txt", "a/new.txt"]);
    Ok(())
}
