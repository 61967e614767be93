use std::fs;
use tempfile::tempdir;
use tunedupe::duplicates::{group_by_digest, group_by_size, DuplicateFinder};
use tunedupe::scanner::{HashError, Hasher, ScanError};

#[test]
fn test_group_by_size_records_missing_paths() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real.mp3");
    fs::write(&real, b"abc").unwrap();
    let missing = dir.path().join("missing.mp3");

    let (groups, stats) = group_by_size(vec![real.clone(), missing.clone()]);

    assert_eq!(groups.get(&3), Some(&vec![real]));
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.errors.len(), 1);
    assert!(matches!(stats.errors[0], ScanError::NotFound(_)));
    assert_eq!(stats.errors[0].path(), missing.as_path());
}

#[test]
fn test_group_by_digest_excludes_unreadable() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.mp3");
    let b = dir.path().join("b.mp3");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();
    let gone = dir.path().join("gone.mp3");

    let (groups, stats) = group_by_digest(vec![a.clone(), gone, b.clone()], &Hasher::new());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.values().next().unwrap(), &vec![a, b]);
    assert_eq!(stats.hashed_files, 2);
    assert_eq!(stats.failed_files, 1);
    assert!(matches!(stats.errors[0], HashError::NotFound(_)));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"same").unwrap();
    fs::write(dir.path().join("b.mp3"), b"same").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c.mp3"), b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (sets, summary) = result.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
    assert!(!summary.scan_errors.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_excluded_from_sets() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"same").unwrap();
    fs::write(dir.path().join("b.mp3"), b"same").unwrap();
    let locked = dir.path().join("c.mp3");
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::File::open(&locked).is_ok() {
        return;
    }

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(!sets[0].paths.contains(&locked));
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].path(), locked.as_path());
}
