use std::collections::BTreeSet;
use std::error::Error;
use std::time::{Duration, SystemTime};

use pollwatch::errors::PollwatchError;
use pollwatch::watch::{ChangeDetector, ListenerOptions, ScanOptions, WatchedDirectory};
use pollwatch_test_utils::{init_tracing, settle, FixtureTree};

type TestResult = Result<(), Box<dyn Error>>;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fixture plus a detector whose working directory is the fixture root and
/// whose baseline is strictly after every fixture file.
fn setup() -> Result<(FixtureTree, ChangeDetector), Box<dyn Error>> {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let detector = ChangeDetector::new(ListenerOptions::in_directory(tree.root()))?;
    settle();
    Ok((tree, detector))
}

#[test]
fn shallow_scan_only_reports_direct_contents() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch_all(&[
        "folder1/file1.txt",
        "folder1/folder2/file2.txt",
        "folder1/deletedfile1.txt",
    ])?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::default())?;
    assert_eq!(
        changes.marked_set(),
        set(&["folder1/deletedfile1.txt", "folder1/file1.txt"])
    );
    Ok(())
}

#[test]
fn all_option_reports_nested_directories() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch_all(&[
        "folder1/file1.txt",
        "folder1/folder2/file2.txt",
        "folder1/deletedfile1.txt",
    ])?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::all())?;
    assert_eq!(
        changes.marked_set(),
        set(&[
            "folder1/deletedfile1.txt",
            "folder1/file1.txt",
            "folder1/folder2/file2.txt",
        ])
    );
    Ok(())
}

#[test]
fn recursive_entry_scans_subtree_without_all() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch("folder1/folder2/file2.txt")?;

    let dirs = [WatchedDirectory::recursive(tree.path("folder1"))];
    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/folder2/file2.txt"]));
    Ok(())
}

#[test]
fn changes_are_reported_again_until_baseline_advances() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch("folder1/file1.txt")?;
    let dirs = [tree.dir("folder1")];

    let first = detector.modified_files(&dirs, ScanOptions::default())?;
    let second = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(first, second);
    assert_eq!(first.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn unchanged_files_are_ignored_after_update() -> TestResult {
    let (tree, mut detector) = setup()?;
    let dirs = [tree.dir("folder1")];

    tree.touch_all(&["folder1/file1.txt", "folder1/deletedfile1.txt"])?;
    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.len(), 2);

    settle();
    detector.update_last_event();

    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert!(changes.is_empty(), "unexpected repeats: {changes:?}");
    Ok(())
}

#[test]
fn content_change_after_update_is_reported() -> TestResult {
    let (tree, mut detector) = setup()?;
    let dirs = [tree.dir("folder1")];

    tree.touch_all(&["folder1/file1.txt", "folder1/deletedfile1.txt"])?;
    detector.modified_files(&dirs, ScanOptions::default())?;
    settle();
    detector.update_last_event();
    settle();

    tree.write("folder1/file1.txt", "changed content")?;

    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn new_files_are_reported() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.write("folder1/brand_new.rs", "fn main() {}")?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/brand_new.rs"]));
    Ok(())
}

#[test]
fn hidden_files_are_included() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch(".dotfile")?;

    let dirs = [WatchedDirectory::new(tree.root())];
    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&[".dotfile"]));
    Ok(())
}

#[test]
fn single_file_entry_is_scanned() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch_all(&["folder1/file1.txt", "folder1/deletedfile1.txt"])?;

    let dirs = [WatchedDirectory::new(tree.path("folder1/file1.txt"))];
    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn relative_entries_resolve_against_working_directory() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch("folder1/file1.txt")?;

    let changes = detector.modified_files(&[WatchedDirectory::from("folder1")], ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn duplicate_entries_collapse() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch("folder1/file1.txt")?;

    let dirs = [
        tree.dir("folder1"),
        WatchedDirectory::new(tree.path("folder1/file1.txt")),
    ];
    let changes = detector.modified_files(&dirs, ScanOptions::all())?;
    assert_eq!(changes.to_marked(), vec!["folder1/file1.txt".to_string()]);
    Ok(())
}

#[test]
fn absolute_paths_when_relativize_disabled() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let mut detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_relativize_paths(false),
    )?;
    settle();

    tree.touch("folder1/file1.txt")?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::default())?;
    let expected = tree.path("folder1/file1.txt").to_string_lossy().into_owned();
    assert_eq!(changes.to_marked(), vec![expected]);
    Ok(())
}

#[test]
fn since_option_sets_initial_baseline() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let two_hours_ago = SystemTime::now() - Duration::from_secs(7200);
    let mut detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_since(two_hours_ago),
    )?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::default())?;
    assert_eq!(
        changes.marked_set(),
        set(&[
            "folder1/deletedfile1.txt",
            "folder1/file1.txt",
            "folder1/movedfile1.txt",
        ])
    );
    Ok(())
}

#[test]
fn mtime_equal_to_baseline_is_not_a_change() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let baseline = SystemTime::now() - Duration::from_secs(60);
    let mut detector =
        ChangeDetector::new(ListenerOptions::in_directory(tree.root()).with_since(baseline))?;
    let dirs = [tree.dir("folder1")];

    tree.set_mtime("folder1/file1.txt", baseline)?;
    assert!(detector.modified_files(&dirs, ScanOptions::default())?.is_empty());

    tree.set_mtime("folder1/file1.txt", baseline + Duration::from_secs(1))?;
    let changes = detector.modified_files(&dirs, ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn update_last_event_moves_baseline_forward() -> TestResult {
    init_tracing();
    let tree = FixtureTree::new()?;
    let before = SystemTime::now();
    let mut detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_since(before - Duration::from_secs(10)),
    )?;

    detector.update_last_event();
    assert!(detector.last_event() >= before);
    Ok(())
}

#[test]
fn update_last_event_never_moves_backwards() -> TestResult {
    init_tracing();
    let tree = FixtureTree::new()?;
    let future = SystemTime::now() + Duration::from_secs(3600);
    let mut detector =
        ChangeDetector::new(ListenerOptions::in_directory(tree.root()).with_since(future))?;

    detector.update_last_event();
    assert_eq!(detector.last_event(), future);
    Ok(())
}

#[test]
fn working_directory_defaults_to_current_dir() -> TestResult {
    init_tracing();
    let detector = ChangeDetector::new(ListenerOptions::default())?;
    assert_eq!(detector.directory(), std::env::current_dir()?.as_path());
    assert!(!detector.watches_deletions());
    Ok(())
}

#[test]
fn ignored_paths_are_never_reported() -> TestResult {
    init_tracing();
    let tree = FixtureTree::standard()?;
    let mut detector = ChangeDetector::new(
        ListenerOptions::in_directory(tree.root()).with_ignore(["**/deleted*"]),
    )?;
    settle();

    tree.touch_all(&["folder1/file1.txt", "folder1/deletedfile1.txt"])?;

    let changes = detector.modified_files(&[tree.dir("folder1")], ScanOptions::default())?;
    assert_eq!(changes.marked_set(), set(&["folder1/file1.txt"]));
    Ok(())
}

#[test]
fn missing_directory_aborts_the_whole_call() -> TestResult {
    let (tree, mut detector) = setup()?;

    tree.touch("folder1/file1.txt")?;

    let result = detector.modified_files(
        &[tree.dir("folder1"), tree.dir("does-not-exist")],
        ScanOptions::default(),
    );
    match result {
        Err(PollwatchError::NotFound(path)) => assert_eq!(path, tree.path("does-not-exist")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}
