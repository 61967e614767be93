use std::fs;
use tempfile::tempdir;
use tunedupe::duplicates::DuplicateFinder;

#[test]
fn test_paths_with_spaces_and_quotes() {
    let dir = tempdir().unwrap();
    let odd = if cfg!(windows) {
        "my 'favourite' song.mp3"
    } else {
        "my \"favourite\" song.mp3"
    };
    fs::write(dir.path().join(odd), b"content").unwrap();
    fs::write(dir.path().join("song.mp3"), b"content").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0].paths[1].to_string_lossy().contains("favourite"));
}

#[test]
fn test_unicode_paths_order_by_characters() {
    let dir = tempdir().unwrap();
    // Four characters but eight bytes in the stem.
    let unicode = dir.path().join("ßßßß.mp3");
    let ascii = dir.path().join("abcde.mp3");
    fs::write(&unicode, b"content").unwrap();
    fs::write(&ascii, b"content").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths, vec![unicode, ascii]);
}

#[test]
fn test_deeply_nested_paths() {
    let dir = tempdir().unwrap();
    let mut deep = dir.path().to_path_buf();
    for i in 0..20 {
        deep.push(format!("level{}", i));
    }
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("track.ogg"), b"content").unwrap();
    fs::write(dir.path().join("track.ogg"), b"content").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths[0], dir.path().join("track.ogg"));
}

#[test]
fn test_file_without_extension_is_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("mp3"), b"content").unwrap();
    fs::write(dir.path().join(".mp3"), b"content").unwrap();
    fs::write(dir.path().join("a.mp3"), b"content").unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}
