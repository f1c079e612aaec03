#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use igniter::cache::{CacheStore, SharedCache};
use igniter::exec::Pool;
use igniter::fs::mock::MockFileSystem;
use igniter::task::{Configuration, FilterRule, Task, TaskSpec};

/// Project root used by mock-filesystem tests.
pub const MOCK_ROOT: &str = "/proj";

/// Builder for `Configuration` to simplify test setup.
///
/// Defaults: 4 workers, no stall signal, no cache, real filesystem.
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            config: Configuration::new(Pool::new(4, None)),
        }
    }

    pub fn with_pool(mut self, pool: Pool) -> Self {
        self.config.pool = pool;
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    pub fn with_dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn with_filter(mut self, pattern: &str, invert: bool) -> Self {
        self.config
            .filters
            .push(FilterRule::new(pattern, invert).expect("valid test regex"));
        self
    }

    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.config.cache = Some(cache);
        self
    }

    pub fn with_mock_fs(mut self, fs: &MockFileSystem) -> Self {
        self.config.fs = Arc::new(fs.clone());
        self.config.root_dir = PathBuf::from(MOCK_ROOT);
        self
    }

    pub fn with_root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root_dir = root.into();
        self
    }

    pub fn build(self) -> Arc<Configuration> {
        Arc::new(self.config)
    }

    /// Bind `spec` to the built configuration.
    pub fn bind(self, spec: TaskSpec) -> Task {
        spec.bind(self.build()).expect("test tree should bind")
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh, empty shared cache.
pub fn empty_cache() -> SharedCache {
    Arc::new(Mutex::new(CacheStore::new()))
}
