// tests/fingerprint.rs

use std::path::Path;

use igniter::cache::{fingerprint_path, fingerprint_paths, hash_file_contents};
use igniter::fs::RealFileSystem;
use igniter::fs::mock::MockFileSystem;

#[test]
fn test_file_contents_hash_is_blake3() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/test.txt", b"hello world");

    let hash = hash_file_contents(&fs, Path::new("/proj/test.txt")).unwrap();
    // blake3 hash of "hello world"
    assert_eq!(
        hash,
        "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
    );
}

#[test]
fn test_missing_path_fingerprints_as_absent() {
    let fs = MockFileSystem::new();
    assert_eq!(fingerprint_path(&fs, Path::new("/proj/nope")).unwrap(), None);

    // A list containing a missing path still produces a fingerprint.
    let fp = fingerprint_paths(&fs, ["/proj/nope"]).unwrap();
    assert_eq!(fp.len(), 64);
}

#[test]
fn test_fingerprint_is_deterministic_and_content_sensitive() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/a.txt", b"a");
    fs.add_file("/proj/src/b.txt", b"b");

    let first = fingerprint_paths(&fs, ["/proj/src"]).unwrap();
    let second = fingerprint_paths(&fs, ["/proj/src"]).unwrap();
    assert_eq!(first, second);

    fs.add_file("/proj/src/b.txt", b"changed");
    let third = fingerprint_paths(&fs, ["/proj/src"]).unwrap();
    assert_ne!(first, third);
}

#[test]
fn test_directory_fingerprint_ignores_listing_order() {
    let forward = MockFileSystem::new();
    forward.add_file("/proj/src/a.txt", b"a");
    forward.add_file("/proj/src/nested/c.txt", b"c");
    forward.add_file("/proj/src/b.txt", b"b");

    let backward = MockFileSystem::new();
    backward.add_file("/proj/src/b.txt", b"b");
    backward.add_file("/proj/src/nested/c.txt", b"c");
    backward.add_file("/proj/src/a.txt", b"a");

    assert_eq!(
        fingerprint_path(&forward, Path::new("/proj/src")).unwrap(),
        fingerprint_path(&backward, Path::new("/proj/src")).unwrap(),
    );
}

#[test]
fn test_renaming_a_file_changes_the_fingerprint() {
    let before = MockFileSystem::new();
    before.add_file("/proj/src/a.txt", b"same");

    let after = MockFileSystem::new();
    after.add_file("/proj/src/renamed.txt", b"same");

    assert_ne!(
        fingerprint_paths(&before, ["/proj/src"]).unwrap(),
        fingerprint_paths(&after, ["/proj/src"]).unwrap(),
    );
}

#[test]
fn test_path_order_matters_for_lists() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/in.txt", b"in");
    fs.add_file("/proj/out.txt", b"out");

    assert_ne!(
        fingerprint_paths(&fs, ["/proj/in.txt", "/proj/out.txt"]).unwrap(),
        fingerprint_paths(&fs, ["/proj/out.txt", "/proj/in.txt"]).unwrap(),
    );
}

#[test]
fn test_mock_and_real_filesystems_agree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("src");
    std::fs::create_dir_all(root.join("nested")).unwrap();
    std::fs::write(root.join("a.txt"), b"alpha").unwrap();
    std::fs::write(root.join("nested").join("b.txt"), b"beta").unwrap();

    let mock = MockFileSystem::new();
    mock.add_file(root.join("a.txt"), b"alpha");
    mock.add_file(root.join("nested").join("b.txt"), b"beta");

    assert_eq!(
        fingerprint_paths(&RealFileSystem, [&root]).unwrap(),
        fingerprint_paths(&mock, [&root]).unwrap(),
    );
}
