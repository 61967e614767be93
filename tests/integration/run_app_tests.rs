use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tunedupe::cli::Cli;
use tunedupe::duplicates::FinderError;
use tunedupe::error::ExitCode;
use tunedupe::run_app;

fn cli(root: &Path, args: &[&str]) -> Cli {
    let mut argv = vec!["dedup".to_string(), root.display().to_string(), "-q".to_string()];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

fn library(root: &Path) {
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a/song.mp3"), b"AAAA").unwrap();
    fs::write(root.join("b/song.mp3"), b"AAAA").unwrap();
    fs::write(root.join("b/other.mp3"), b"BBBB").unwrap();
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = tempdir().unwrap();
    library(dir.path());

    let code = run_app(cli(dir.path(), &["--dry-run", "--no-color"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a/song.mp3").exists());
    assert!(dir.path().join("b/song.mp3").exists());
}

#[test]
fn test_json_output_touches_nothing() {
    let dir = tempdir().unwrap();
    library(dir.path());

    let code = run_app(cli(dir.path(), &["--output", "json"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a/song.mp3").exists());
    assert!(dir.path().join("b/song.mp3").exists());
}

#[test]
fn test_yes_keeps_shortest_path() {
    let dir = tempdir().unwrap();
    library(dir.path());

    let code = run_app(cli(dir.path(), &["--yes", "--no-color"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a/song.mp3").exists());
    assert!(!dir.path().join("b/song.mp3").exists());
    assert!(dir.path().join("b/other.mp3").exists());
}

#[test]
fn test_no_duplicates_is_success() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.mp3"), b"alone").unwrap();

    let code = run_app(cli(dir.path(), &["--no-color"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("only.mp3").exists());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = run_app(cli(&missing, &["--dry-run"])).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert!(format!("{:#}", err).contains("nope"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_is_fatal() {
    use std::os::unix::fs::PermissionsExt;
    use tunedupe::scanner::ScanError;

    let dir = tempdir().unwrap();
    let root = dir.path().join("music");
    library(&root);
    fs::set_permissions(&root, fs::Permissions::from_mode(0o333)).unwrap();

    // Root ignores permission bits; nothing to observe then.
    if fs::read_dir(&root).is_ok() {
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = run_app(cli(&root, &["--dry-run"]));
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::ScanError(ScanError::PermissionDenied(_)))
    ));
    assert!(root.join("a/song.mp3").exists());
}

#[test]
fn test_inverted_size_range_is_fatal() {
    let dir = tempdir().unwrap();

    let result = run_app(cli(dir.path(), &["--min-size", "2KB", "--max-size", "1KB"]));

    assert!(result.is_err());
}
