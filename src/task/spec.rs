// src/task/spec.rs

//! Unbound task trees.
//!
//! A [`TaskSpec`] describes *what* to run. Binding it to a [`Configuration`]
//! checks names, computes every task's keys top-down and produces the
//! runnable [`Task`] tree. A `Task` therefore never exists without its
//! configuration.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::errors::{ExecutionError, IgniterError, Result};
use crate::task::composite::CompositeTask;
use crate::task::context::{Configuration, TaskIdent, validate_task_name};
use crate::task::leaf::LeafTask;
use crate::task::Task;
use crate::types::ConcurrencyMode;

/// In-process executor of a leaf.
pub type Executor =
    Arc<dyn Fn() -> BoxFuture<'static, std::result::Result<(), ExecutionError>> + Send + Sync>;

/// Custom skip predicate: `Ok(true)` means the task must run.
pub type Predicate = Arc<dyn Fn() -> anyhow::Result<bool> + Send + Sync>;

/// What a leaf does when it runs.
#[derive(Clone)]
pub enum Action {
    /// Shell commands run one after another through the pool.
    Commands(Vec<String>),
    /// Async closure run in-process, outside the pool.
    Custom(Executor),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Commands(cmds) => f.debug_tuple("Commands").field(cmds).finish(),
            Action::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Decides whether a leaf can be skipped.
#[derive(Clone)]
pub enum SkipPolicy {
    /// Skip when the fingerprint of `inputs` + `outputs` matches the one
    /// recorded after the last successful run.
    Fingerprint {
        inputs: Vec<PathBuf>,
        outputs: Vec<PathBuf>,
    },
    Predicate(Predicate),
}

impl SkipPolicy {
    /// Paths hashed for the fingerprint policy: inputs, then outputs.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        match self {
            SkipPolicy::Fingerprint { inputs, outputs } => {
                inputs.iter().chain(outputs.iter()).cloned().collect()
            }
            SkipPolicy::Predicate(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for SkipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipPolicy::Fingerprint { inputs, outputs } => f
                .debug_struct("Fingerprint")
                .field("inputs", inputs)
                .field("outputs", outputs)
                .finish(),
            SkipPolicy::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeafSpec {
    pub name: String,
    pub action: Action,
    pub skip: Option<SkipPolicy>,
}

#[derive(Debug, Clone)]
pub struct CompositeSpec {
    pub name: String,
    pub mode: ConcurrencyMode,
    pub children: Vec<TaskSpec>,
}

#[derive(Debug, Clone)]
pub enum TaskSpec {
    Leaf(LeafSpec),
    Composite(CompositeSpec),
}

impl TaskSpec {
    /// Leaf running a single shell command.
    pub fn command(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self::commands(name, [cmd.into()])
    }

    /// Leaf running several shell commands in order; the first failure
    /// fails the leaf.
    pub fn commands<I, S>(name: impl Into<String>, cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TaskSpec::Leaf(LeafSpec {
            name: name.into(),
            action: Action::Commands(cmds.into_iter().map(Into::into).collect()),
            skip: None,
        })
    }

    /// Leaf running an async closure in-process.
    pub fn custom<F, Fut>(name: impl Into<String>, executor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), ExecutionError>> + Send + 'static,
    {
        let executor: Executor = Arc::new(move || executor().boxed());
        TaskSpec::Leaf(LeafSpec {
            name: name.into(),
            action: Action::Custom(executor),
            skip: None,
        })
    }

    /// Leaf that sleeps for `delay` and then succeeds or fails.
    pub fn dummy(name: impl Into<String>, delay: Duration, fail: bool) -> Self {
        Self::custom(name, move || async move {
            tokio::time::sleep(delay).await;
            if fail {
                Err(ExecutionError::msg("dummy task configured to fail"))
            } else {
                Ok(())
            }
        })
    }

    pub fn group(name: impl Into<String>, mode: ConcurrencyMode, children: Vec<TaskSpec>) -> Self {
        TaskSpec::Composite(CompositeSpec {
            name: name.into(),
            mode,
            children,
        })
    }

    pub fn sequential(name: impl Into<String>, children: Vec<TaskSpec>) -> Self {
        Self::group(name, ConcurrencyMode::Sequential, children)
    }

    pub fn concurrent(name: impl Into<String>, children: Vec<TaskSpec>) -> Self {
        Self::group(name, ConcurrencyMode::Concurrent, children)
    }

    /// Use the fingerprint skip policy. Has no effect on groups.
    pub fn with_fingerprint<I, O, P, Q>(self, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = P>,
        O: IntoIterator<Item = Q>,
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        self.with_skip_policy(SkipPolicy::Fingerprint {
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        })
    }

    /// Use a custom predicate (`true` = run). Has no effect on groups.
    pub fn with_predicate<F>(self, predicate: F) -> Self
    where
        F: Fn() -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.with_skip_policy(SkipPolicy::Predicate(Arc::new(predicate)))
    }

    fn with_skip_policy(self, policy: SkipPolicy) -> Self {
        match self {
            TaskSpec::Leaf(mut leaf) => {
                leaf.skip = Some(policy);
                TaskSpec::Leaf(leaf)
            }
            group @ TaskSpec::Composite(_) => group,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaskSpec::Leaf(leaf) => &leaf.name,
            TaskSpec::Composite(group) => &group.name,
        }
    }

    /// Attach `config` to this tree and compute every task's keys.
    ///
    /// Fails if a name is invalid or two siblings share a name.
    pub fn bind(self, config: Arc<Configuration>) -> Result<Task> {
        validate_task_name(self.name())?;
        let ident = TaskIdent::root(self.name());
        self.bind_as(ident, &config)
    }

    fn bind_as(self, ident: TaskIdent, config: &Arc<Configuration>) -> Result<Task> {
        match self {
            TaskSpec::Leaf(leaf) => Ok(Task::Leaf(LeafTask::new(
                ident,
                leaf.action,
                leaf.skip,
                Arc::clone(config),
            ))),
            TaskSpec::Composite(group) => {
                let mut seen = HashSet::new();
                let mut children = Vec::with_capacity(group.children.len());

                for child in group.children {
                    validate_task_name(child.name())?;
                    if !seen.insert(child.name().to_string()) {
                        return Err(IgniterError::ConfigError(format!(
                            "group '{}' has more than one child named '{}'",
                            ident.qualified_key,
                            child.name()
                        )));
                    }
                    let child_ident = ident.child(child.name(), config.key_display);
                    children.push(child.bind_as(child_ident, config)?);
                }

                Ok(Task::Composite(CompositeTask::new(
                    ident,
                    group.mode,
                    children,
                    Arc::clone(config),
                )))
            }
        }
    }
}
