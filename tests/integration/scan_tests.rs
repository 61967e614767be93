use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tunedupe::duplicates::{find_duplicate_sets, DuplicateFinder, FinderConfig};
use tunedupe::scanner::{enumerate_candidates, ExtensionSet, WalkerConfig};

fn create_file(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp3", b"a");
    create_file(dir.path(), "b.mp3", b"bb");
    create_file(dir.path(), "c.mp3", b"ccc");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.mp3", b"aaaa");
    create_file(dir.path(), "b.mp3", b"bbbb");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_scan_library_with_copies() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let a = create_file(root, "a/song.mp3", b"AAAA");
    let b = create_file(root, "b/song.mp3", b"AAAA");
    create_file(root, "c/other.mp3", b"BBBB");
    create_file(root, "d/notes.txt", b"AAAA");

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths, vec![a, b]);
    assert_eq!(sets[0].size, 4);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 4);
}

#[test]
fn test_scan_three_way_set_shortest_first() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let long = create_file(root, "collection/backup/track.flac", b"same bytes");
    let short = create_file(root, "track.flac", b"same bytes");
    let middle = create_file(root, "albums/track.flac", b"same bytes");

    let (sets, summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths, vec![short, middle, long]);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 20);
}

#[test]
fn test_scan_multiple_sets_are_ordered() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    create_file(root, "z/1.mp3", b"first");
    create_file(root, "z/2.mp3", b"first");
    create_file(root, "a/1.ogg", b"second!");
    create_file(root, "a/2.ogg", b"second!");

    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    assert_eq!(sets.len(), 2);
    assert!(sets[0].paths[0].ends_with("a/1.ogg"));
    assert!(sets[1].paths[0].ends_with("z/1.mp3"));
}

#[test]
fn test_scan_extension_is_case_insensitive() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "LOUD.MP3", b"content");
    create_file(dir.path(), "quiet.mp3", b"content");

    let sets = find_duplicate_sets(dir.path(), &ExtensionSet::audio()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
}

#[test]
fn test_scan_custom_extensions() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.txt", b"content");
    create_file(dir.path(), "b.txt", b"content");
    create_file(dir.path(), "a.mp3", b"content");

    let sets = find_duplicate_sets(dir.path(), &ExtensionSet::new(["txt"])).unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0].paths.iter().all(|p| p.extension().unwrap() == "txt"));
}

#[test]
fn test_scan_size_filters() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "small1.mp3", b"tiny");
    create_file(dir.path(), "small2.mp3", b"tiny");
    create_file(dir.path(), "big1.mp3", &[7u8; 2048]);
    create_file(dir.path(), "big2.mp3", &[7u8; 2048]);

    let walker_config = WalkerConfig::default().with_min_size(Some(1024));
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 2048);
    assert_eq!(summary.total_files, 2);

    let walker_config = WalkerConfig::default().with_max_size(Some(100));
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (sets, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 4);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "visible.mp3", b"content");
    create_file(dir.path(), ".hidden/copy.mp3", b"content");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_skip_hidden(true));
    let (sets, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_follow_symlinks() {
    let dir = tempdir().unwrap();
    let target = create_file(dir.path(), "real.mp3", b"content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.mp3")).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a.wav", b"");
    create_file(dir.path(), "b.wav", b"");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_is_repeatable() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        create_file(dir.path(), &format!("d{}/t.mp3", i), format!("{}", i % 3).as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();
    let (threaded, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(4))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(first, threaded);
}

#[test]
fn test_enumerate_candidates_filters_and_orders() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "b/2.flac", b"x");
    create_file(dir.path(), "a/1.mp3", b"x");
    create_file(dir.path(), "a/cover.jpg", b"x");

    let first: Vec<PathBuf> = enumerate_candidates(dir.path(), &ExtensionSet::audio())
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let second: Vec<PathBuf> = enumerate_candidates(dir.path(), &ExtensionSet::audio())
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|p| !p.ends_with("cover.jpg")));
    assert_eq!(first, second);
}
