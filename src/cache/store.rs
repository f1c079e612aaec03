// src/cache/store.rs

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Default location of the cache file, relative to the project root.
pub const DEFAULT_CACHE_FILE: &str = ".igniter/cache.json";

/// Map from fully-qualified task key to the fingerprint recorded after the
/// task last succeeded.
///
/// On disk this is a JSON list of `[key, fingerprint]` pairs sorted by key,
/// so saving the same entries always produces the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStore {
    entries: BTreeMap<String, String>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`, falling back to an empty store when the
    /// file is missing or unreadable.
    pub fn open(fs: &dyn FileSystem, path: &Path) -> Self {
        let mut store = Self::new();
        if let Err(err) = store.load(fs, path) {
            warn!(path = ?path, error = %err, "ignoring unreadable cache file");
            store.clear();
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, fingerprint: impl Into<String>) {
        let key = key.into();
        let fingerprint = fingerprint.into();
        debug!(task = %key, fingerprint = %fingerprint, "recorded fingerprint");
        self.entries.insert(key, fingerprint);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace the contents of this store with the pairs saved at `path`.
    ///
    /// A missing file leaves the store empty.
    pub fn load(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        self.entries.clear();

        if !fs.exists(path) {
            debug!(path = ?path, "no cache file yet");
            return Ok(());
        }

        let contents = fs.read_to_string(path)?;
        let pairs: Vec<(String, String)> = serde_json::from_str(&contents)?;
        self.entries.extend(pairs);

        info!(path = ?path, entries = self.entries.len(), "loaded task cache");
        Ok(())
    }

    /// Write every entry to `path` in key order, creating parent directories
    /// as needed.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let pairs: Vec<(&str, &str)> = self.iter().collect();
        let contents = serde_json::to_string(&pairs)?;
        fs.write(path, contents.as_bytes())
            .with_context(|| format!("saving task cache to {:?}", path))?;

        info!(path = ?path, entries = pairs.len(), "saved task cache");
        Ok(())
    }
}
