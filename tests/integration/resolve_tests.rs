use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use tunedupe::actions::{delete_resolution, resolve, Choice, DeleteConfig, DeleteError};
use tunedupe::duplicates::DuplicateSet;

#[test]
fn test_resolve_then_delete_leaves_one_copy() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["x.mp3", "copy of x.mp3", "another copy of x.mp3"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"0123456789").unwrap();
            path
        })
        .collect();
    let set = DuplicateSet::new([3u8; 32], 10, paths.clone());

    for k in 1..=set.len() {
        let resolution = set.resolve(Choice::Index(k)).unwrap();
        assert_eq!(resolution.kept, set.paths[k - 1]);
        assert_eq!(resolution.remove.len(), set.len() - 1);
    }

    let resolution = set.resolve(Choice::Index(2)).unwrap();
    let result = delete_resolution(&resolution, &DeleteConfig::permanent()).unwrap();

    assert!(result.all_succeeded());
    assert_eq!(result.bytes_freed, 20);
    let left: Vec<_> = paths.iter().filter(|p| p.exists()).collect();
    assert_eq!(left, vec![&set.paths[1]]);
}

#[test]
fn test_out_of_range_choices_are_rejected() {
    let paths = vec![PathBuf::from("/a.mp3"), PathBuf::from("/b.mp3")];

    assert!(resolve(&paths, Choice::Index(0)).is_err());
    assert!(resolve(&paths, Choice::Index(3)).is_err());
    assert!(resolve(&[], Choice::Default).is_err());
}

#[test]
fn test_missing_removal_target_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("a.mp3");
    let gone = dir.path().join("bb.mp3");
    let other = dir.path().join("ccc.mp3");
    fs::write(&keep, b"data").unwrap();
    fs::write(&other, b"data").unwrap();

    let resolution = resolve(&[keep.clone(), gone.clone(), other.clone()], Choice::Index(1)).unwrap();
    let result = delete_resolution(&resolution, &DeleteConfig::permanent()).unwrap();

    assert!(keep.exists());
    assert!(!other.exists());
    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].0, gone);
}

#[test]
fn test_missing_kept_file_aborts_before_removal() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("a.mp3");
    let other = dir.path().join("b.mp3");
    fs::write(&other, b"data").unwrap();

    let resolution = resolve(&[keep.clone(), other.clone()], Choice::Index(1)).unwrap();
    let err = delete_resolution(&resolution, &DeleteConfig::permanent()).unwrap_err();

    assert!(matches!(err, DeleteError::KeptFileMissing(ref p) if *p == keep));
    assert!(other.exists());
}
