use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tunedupe::actions::DeleteConfig;
use tunedupe::duplicates::{DuplicateFinder, DuplicateSet};
use tunedupe::interactive::{Session, SessionSummary, PROMPT};

fn create_file(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Two sets: `a/x.mp3` + `b/x.mp3`, and `c/y.flac` + `c/deep/y.flac`.
fn library() -> (TempDir, Vec<DuplicateSet>) {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a/x.mp3", b"first set");
    create_file(dir.path(), "b/x.mp3", b"first set");
    create_file(dir.path(), "c/y.flac", b"the second set");
    create_file(dir.path(), "c/deep/y.flac", b"the second set");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 2);
    (dir, sets)
}

fn run_session(input: &str, sets: &[DuplicateSet]) -> (SessionSummary, String) {
    let mut session = Session::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        DeleteConfig::permanent(),
    );
    let summary = session.run(sets).unwrap();
    let (_, output) = session.into_inner();
    (summary, String::from_utf8(output).unwrap())
}

fn surviving(sets: &[DuplicateSet]) -> Vec<usize> {
    sets.iter()
        .map(|set| set.paths.iter().filter(|p| p.exists()).count())
        .collect()
}

#[test]
fn test_defaults_keep_shortest_of_every_set() {
    let (_dir, sets) = library();

    let (summary, output) = run_session("\n\n", &sets);

    assert_eq!(surviving(&sets), vec![1, 1]);
    assert!(sets[0].paths[0].exists());
    assert!(sets[1].paths[0].exists());
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.removed_files, 2);
    assert_eq!(summary.bytes_freed, 9 + 14);
    assert_eq!(output.matches(PROMPT).count(), 2);
}

#[test]
fn test_explicit_choice_keeps_that_member() {
    let (_dir, sets) = library();

    let (summary, _) = run_session("2\ns\n", &sets);

    assert!(!sets[0].paths[0].exists());
    assert!(sets[0].paths[1].exists());
    assert_eq!(surviving(&sets), vec![1, 2]);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_invalid_input_reprompts_same_set() {
    let (_dir, sets) = library();

    let (summary, output) = run_session("9\nabc\n1\nq\n", &sets);

    assert_eq!(output.matches(PROMPT).count(), 4);
    assert!(output.contains("invalid choice 9"));
    assert!(output.contains("enter a number between 1 and 2"));
    assert_eq!(surviving(&sets), vec![1, 2]);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.untouched, 1);
}

#[test]
fn test_quit_leaves_everything_untouched() {
    let (_dir, sets) = library();

    let (summary, _) = run_session("quit\n", &sets);

    assert_eq!(surviving(&sets), vec![2, 2]);
    assert_eq!(summary.untouched, 2);
    assert_eq!(summary.removed_files, 0);
    assert!(!summary.interrupted);
}

#[test]
fn test_end_of_input_stops() {
    let (_dir, sets) = library();

    let (summary, _) = run_session("", &sets);

    assert_eq!(surviving(&sets), vec![2, 2]);
    assert_eq!(summary.untouched, 2);
}

#[test]
fn test_shutdown_flag_stops_before_first_set() {
    let (_dir, sets) = library();
    let flag = Arc::new(AtomicBool::new(true));

    let mut session = Session::new(
        Cursor::new(b"1\n1\n".to_vec()),
        Vec::new(),
        DeleteConfig::permanent(),
    )
    .with_shutdown_flag(flag);
    let summary = session.run(&sets).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.untouched, 2);
    assert_eq!(surviving(&sets), vec![2, 2]);
}

#[test]
fn test_vanished_kept_file_leaves_set_untouched() {
    let (_dir, sets) = library();
    fs::remove_file(&sets[0].paths[1]).unwrap();

    let (summary, output) = run_session("2\n\n", &sets);

    assert!(sets[0].paths[0].exists());
    assert!(output.contains("Left untouched"));
    assert_eq!(summary.refused, 1);
    assert_eq!(summary.resolved, 1);
    assert_eq!(surviving(&sets), vec![1, 1]);
}

#[test]
fn test_auto_resolve_keeps_defaults() {
    let (_dir, sets) = library();

    let mut session = Session::new(Cursor::new(Vec::new()), Vec::new(), DeleteConfig::permanent());
    let summary = session.auto_resolve(&sets).unwrap();
    let (_, output) = session.into_inner();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(summary.resolved, 2);
    assert!(!output.contains(PROMPT));
    assert!(sets[0].paths[0].exists());
    assert!(sets[1].paths[0].exists());
    assert_eq!(surviving(&sets), vec![1, 1]);
}

#[test]
fn test_summary_display() {
    let (_dir, sets) = library();

    let (summary, _) = run_session("1\ns\n", &sets);

    assert_eq!(
        summary.to_string(),
        "1 set(s) resolved, 1 skipped, 0 untouched; removed 1 file(s), freed 9 B"
    );
}
