// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::task::TaskSpec;
use crate::types::{ConcurrencyMode, KeyDisplay};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [settings]
/// cache_file = ".igniter/cache.json"
/// stall_timeout_secs = 60
///
/// [task]
/// name = "project"
/// concurrent = true
///
/// [[task.tasks]]
/// name = "build"
/// cmd = ["cargo build --release"]
/// inputs = ["src", "Cargo.toml"]
/// outputs = ["target/release/app"]
/// ```
///
/// Use [`ConfigFile`] (via `TryFrom`) for the validated form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,

    /// The root of the task tree.
    pub task: RawTaskNode,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
    /// Cache file, relative to the directory holding the config file.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Seconds a process may run before "still running" warnings start.
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,

    /// Display keys as `parent.child` instead of the bare task name.
    #[serde(default)]
    pub nested_keys: bool,
}

fn default_cache_file() -> String {
    crate::cache::DEFAULT_CACHE_FILE.to_string()
}

fn default_stall_timeout_secs() -> u64 {
    60
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
            stall_timeout_secs: default_stall_timeout_secs(),
            nested_keys: false,
        }
    }
}

impl SettingsSection {
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }

    pub fn key_display(&self) -> KeyDisplay {
        if self.nested_keys {
            KeyDisplay::Nested
        } else {
            KeyDisplay::Flat
        }
    }
}

/// A node of the task tree: a leaf when it has `cmd`, a group when it has
/// `tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTaskNode {
    pub name: String,

    /// Shell command(s) of a leaf.
    #[serde(default)]
    pub cmd: Option<CommandList>,

    /// Children of a group.
    #[serde(default)]
    pub tasks: Option<Vec<RawTaskNode>>,

    /// Run a group's children concurrently. Groups only.
    #[serde(default)]
    pub concurrent: Option<bool>,

    /// Paths whose contents decide whether a leaf is up to date.
    #[serde(default)]
    pub inputs: Option<Vec<String>>,

    /// Paths a leaf produces; also fingerprinted.
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
}

/// `cmd = "..."` or `cmd = ["...", "..."]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandList {
    One(String),
    Many(Vec<String>),
}

impl CommandList {
    pub fn as_slice(&self) -> &[String] {
        match self {
            CommandList::One(cmd) => std::slice::from_ref(cmd),
            CommandList::Many(cmds) => cmds,
        }
    }
}

impl RawTaskNode {
    pub fn is_group(&self) -> bool {
        self.tasks.is_some()
    }

    fn has_fingerprint_paths(&self) -> bool {
        self.inputs.is_some() || self.outputs.is_some()
    }
}

/// A validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: SettingsSection,
    pub task: RawTaskNode,
}

impl ConfigFile {
    /// Build without running validation. Callers normally go through
    /// `ConfigFile::try_from(raw)`.
    pub(crate) fn new_unchecked(settings: SettingsSection, task: RawTaskNode) -> Self {
        Self { settings, task }
    }

    /// Convert the task tree into an unbound [`TaskSpec`].
    pub fn to_task_spec(&self) -> TaskSpec {
        node_to_spec(&self.task)
    }
}

fn node_to_spec(node: &RawTaskNode) -> TaskSpec {
    if let Some(children) = &node.tasks {
        let mode = if node.concurrent.unwrap_or(false) {
            ConcurrencyMode::Concurrent
        } else {
            ConcurrencyMode::Sequential
        };
        return TaskSpec::group(
            node.name.clone(),
            mode,
            children.iter().map(node_to_spec).collect(),
        );
    }

    let cmds = node
        .cmd
        .as_ref()
        .map(|c| c.as_slice().to_vec())
        .unwrap_or_default();
    let leaf = TaskSpec::commands(node.name.clone(), cmds);

    if node.has_fingerprint_paths() {
        leaf.with_fingerprint(
            node.inputs.clone().unwrap_or_default(),
            node.outputs.clone().unwrap_or_default(),
        )
    } else {
        leaf
    }
}
