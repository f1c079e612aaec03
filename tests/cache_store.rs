// tests/cache_store.rs

use std::path::Path;
use std::sync::Arc;

use igniter::cache::{CacheFile, CacheStore};
use igniter::fs::mock::MockFileSystem;
use igniter::fs::{FileSystem, RealFileSystem};

#[test]
fn test_missing_entry_is_none() {
    let store = CacheStore::new();
    assert_eq!(store.get("root:build"), None);
    assert!(store.is_empty());
}

#[test]
fn test_save_then_load_restores_entries() {
    let fs = MockFileSystem::new();
    let path = Path::new("/proj/.igniter/cache.json");

    let mut store = CacheStore::new();
    store.set("root:build", "abc");
    store.set("root:docs", "def");
    store.save(&fs, path).unwrap();

    let mut loaded = CacheStore::new();
    loaded.set("stale", "entry");
    loaded.load(&fs, path).unwrap();

    assert_eq!(loaded, store);
    assert_eq!(loaded.get("root:build"), Some("abc"));
    assert_eq!(loaded.get("stale"), None);
}

#[test]
fn test_file_is_a_list_of_pairs() {
    let fs = MockFileSystem::new();
    let path = Path::new("/proj/cache.json");

    let mut store = CacheStore::new();
    store.set("root:a", "1");
    store.save(&fs, path).unwrap();

    let raw = fs.read_to_string(path).unwrap();
    let parsed: Vec<(String, String)> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, vec![("root:a".to_string(), "1".to_string())]);
}

#[test]
fn test_missing_file_loads_empty() {
    let fs = MockFileSystem::new();
    let mut store = CacheStore::new();
    store.load(&fs, Path::new("/proj/missing.json")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_corrupt_file_opens_empty() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/cache.json", b"{ not json");

    let mut store = CacheStore::new();
    assert!(store.load(&fs, Path::new("/proj/cache.json")).is_err());

    let opened = CacheStore::open(&fs, Path::new("/proj/cache.json"));
    assert!(opened.is_empty());
}

#[test]
fn test_save_creates_parent_directories_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep").join("dir").join("cache.json");

    let mut store = CacheStore::new();
    store.set("root:build", "abc");
    store.save(&RealFileSystem, &path).unwrap();

    assert!(path.is_file());
    assert!(!path.with_file_name("cache.json.tmp").exists());

    let reopened = CacheStore::open(&RealFileSystem, &path);
    assert_eq!(reopened.get("root:build"), Some("abc"));
}

#[test]
fn test_cache_file_shares_its_store() {
    let fs = Arc::new(MockFileSystem::new());
    let cache = CacheFile::open(fs.clone(), "/proj/cache.json");

    cache.shared().lock().unwrap().set("root:build", "fp");
    cache.save().unwrap();

    let reopened = CacheStore::open(fs.as_ref(), Path::new("/proj/cache.json"));
    assert_eq!(reopened.get("root:build"), Some("fp"));
}

#[test]
fn test_saved_file_lists_entries_sorted_by_key() {
    let fs = MockFileSystem::new();
    let path = Path::new("/proj/.igniter/cache.json");

    let mut store = CacheStore::new();
    store.set("root:test", "2");
    store.set("root:build", "1");
    store.save(&fs, path).unwrap();

    let contents = fs.read_to_string(path).unwrap();
    assert_eq!(contents, r#"[["root:build","1"],["root:test","2"]]"#);

    let mut reordered = CacheStore::new();
    reordered.set("root:build", "1");
    reordered.set("root:test", "2");
    reordered.save(&fs, path).unwrap();
    assert_eq!(fs.read_to_string(path).unwrap(), contents);
}
