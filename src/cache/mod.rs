// src/cache/mod.rs

//! Content fingerprints and the persisted task cache.
//!
//! - [`fingerprint`] hashes files and directory trees with `blake3`.
//! - [`store`] keeps the `task key -> fingerprint` map and reads/writes it
//!   as a flat JSON file.

pub mod fingerprint;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use fingerprint::{fingerprint_path, fingerprint_paths, hash_file_contents};
pub use store::{CacheStore, DEFAULT_CACHE_FILE};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Cache store shared by every task of a run.
///
/// The lock is only ever taken for a synchronous `get`/`set`, never across
/// an `.await`.
pub type SharedCache = Arc<Mutex<CacheStore>>;

/// Lock the shared store. A poisoned lock still holds a usable map.
pub fn lock_cache(cache: &SharedCache) -> MutexGuard<'_, CacheStore> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A shared store together with the file it was opened from.
#[derive(Debug, Clone)]
pub struct CacheFile {
    store: SharedCache,
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl CacheFile {
    /// Open `path` through `fs`. A missing or corrupt file yields an empty store.
    pub fn open(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = CacheStore::open(fs.as_ref(), &path);
        Self {
            store: Arc::new(Mutex::new(store)),
            path,
            fs,
        }
    }

    /// Handle to give to `Configuration::with_cache`.
    pub fn shared(&self) -> SharedCache {
        Arc::clone(&self.store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the current entries to [`CacheFile::path`].
    pub fn save(&self) -> Result<()> {
        lock_cache(&self.store).save(self.fs.as_ref(), &self.path)
    }
}
