// src/task/context.rs

//! Run configuration shared by every task, plus key and filter helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::cache::SharedCache;
use crate::errors::{IgniterError, Result};
use crate::exec::Pool;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::KeyDisplay;

/// Separator between ancestor names in a fully-qualified key.
pub const KEY_SEPARATOR: char = ':';

/// Separator between ancestor names in a nested display key.
pub const DISPLAY_SEPARATOR: char = '.';

/// Include/exclude rule matched against fully-qualified task keys.
#[derive(Debug, Clone)]
pub struct FilterRule {
    pattern: Regex,
    invert: bool,
}

impl FilterRule {
    pub fn new(pattern: &str, invert: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            IgniterError::ConfigError(format!("invalid filter pattern '{pattern}': {e}"))
        })?;
        Ok(Self { pattern, invert })
    }

    /// Rule that only lets matching keys through.
    pub fn include(pattern: &str) -> Result<Self> {
        Self::new(pattern, false)
    }

    /// Rule that lets everything through except matching keys.
    pub fn exclude(pattern: &str) -> Result<Self> {
        Self::new(pattern, true)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn allows(&self, key: &str) -> bool {
        self.pattern.is_match(key) != self.invert
    }
}

/// A key is allowed only if every rule allows it.
pub fn filters_allow(rules: &[FilterRule], key: &str) -> bool {
    rules.iter().all(|rule| rule.allows(key))
}

/// Everything a task needs at run time. Built once before binding and
/// never mutated afterwards (the cache store has its own lock).
#[derive(Clone)]
pub struct Configuration {
    pub debug: bool,
    pub dry_run: bool,
    pub filters: Vec<FilterRule>,
    pub cache: Option<SharedCache>,
    pub pool: Pool,
    pub key_display: KeyDisplay,
    /// Directory commands run in and watched paths are resolved against.
    pub root_dir: PathBuf,
    pub fs: Arc<dyn FileSystem>,
}

impl Configuration {
    pub fn new(pool: Pool) -> Self {
        Self {
            debug: false,
            dry_run: false,
            filters: Vec::new(),
            cache: None,
            pool,
            key_display: KeyDisplay::default(),
            root_dir: PathBuf::from("."),
            fs: Arc::new(RealFileSystem),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterRule>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_key_display(mut self, key_display: KeyDisplay) -> Self {
        self.key_display = key_display;
        self
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Resolve a task-relative path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root_dir.join(path)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("debug", &self.debug)
            .field("dry_run", &self.dry_run)
            .field("filters", &self.filters)
            .field("cache", &self.cache.is_some())
            .field("pool", &self.pool)
            .field("key_display", &self.key_display)
            .field("root_dir", &self.root_dir)
            .finish_non_exhaustive()
    }
}

/// Names and keys of a bound task, computed top-down at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIdent {
    pub name: String,
    /// Key shown to the user.
    pub key: String,
    /// Ancestor names joined by [`KEY_SEPARATOR`]; used for filters and
    /// cache entries.
    pub qualified_key: String,
}

impl TaskIdent {
    pub fn root(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: name.to_string(),
            qualified_key: name.to_string(),
        }
    }

    pub fn child(&self, name: &str, display: KeyDisplay) -> Self {
        let key = match display {
            KeyDisplay::Flat => name.to_string(),
            KeyDisplay::Nested => format!("{}{DISPLAY_SEPARATOR}{name}", self.key),
        };
        Self {
            name: name.to_string(),
            key,
            qualified_key: format!("{}{KEY_SEPARATOR}{name}", self.qualified_key),
        }
    }
}

/// Task names must be non-empty and must not contain key separators.
pub fn validate_task_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(IgniterError::ConfigError(
            "task names must not be empty".to_string(),
        ));
    }
    if name.contains(KEY_SEPARATOR) || name.contains(DISPLAY_SEPARATOR) {
        return Err(IgniterError::ConfigError(format!(
            "task name '{name}' must not contain '{KEY_SEPARATOR}' or '{DISPLAY_SEPARATOR}'"
        )));
    }
    Ok(())
}
