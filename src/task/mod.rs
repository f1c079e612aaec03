// src/task/mod.rs

//! The task tree.
//!
//! - [`spec`] builds unbound trees and binds them to a configuration.
//! - [`leaf`] and [`composite`] are the two kinds of bound task, wrapped by
//!   the [`Task`] enum.
//! - [`status`] holds the status transition function and the rule that
//!   derives a group's status from its children.
//! - [`events`] is the observer protocol used by reporters.
//! - [`context`] is the shared run configuration and key/filter helpers.

pub mod composite;
pub mod context;
pub mod events;
pub mod leaf;
pub mod spec;
pub mod status;

use futures::future::BoxFuture;

use crate::errors::Result;
use crate::types::{TaskKind, TaskStatus};

pub use composite::CompositeTask;
pub use context::{Configuration, FilterRule, TaskIdent, filters_allow};
pub use events::{Listener, StatusChange, TaskEvent};
pub use leaf::{LeafTask, SkipReason};
pub use spec::{Action, SkipPolicy, TaskSpec};
pub use status::aggregate_status;

/// A bound task: either a single unit of work or a group of tasks.
#[derive(Debug)]
pub enum Task {
    Leaf(LeafTask),
    Composite(CompositeTask),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Leaf(_) => TaskKind::Leaf,
            Task::Composite(_) => TaskKind::Composite,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Task::Leaf(leaf) => leaf.name(),
            Task::Composite(group) => group.name(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Task::Leaf(leaf) => leaf.key(),
            Task::Composite(group) => group.key(),
        }
    }

    pub fn qualified_key(&self) -> &str {
        match self {
            Task::Leaf(leaf) => leaf.qualified_key(),
            Task::Composite(group) => group.qualified_key(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Task::Leaf(leaf) => leaf.status(),
            Task::Composite(group) => group.status(),
        }
    }

    /// Run this task (and, for a group, its subtree).
    ///
    /// An `Err` is a fatal abort: debug-mode failure or a failing skip
    /// predicate. Contained failures show up as `Failed` statuses instead.
    pub fn run(&mut self) -> BoxFuture<'_, Result<()>> {
        match self {
            Task::Leaf(leaf) => Box::pin(leaf.run()),
            Task::Composite(group) => Box::pin(group.run()),
        }
    }

    /// Register `listener` on this task and all of its descendants.
    pub fn subscribe(&mut self, listener: Listener) {
        match self {
            Task::Leaf(leaf) => leaf.subscribe(listener),
            Task::Composite(group) => group.subscribe(listener),
        }
    }

    /// Human readable line(s) for this task, indented by `depth`.
    pub fn render(&self, depth: usize) -> String {
        match self {
            Task::Leaf(leaf) => leaf.render(depth),
            Task::Composite(group) => group.render(depth),
        }
    }

    /// Number of leaves expected to execute, given the current configuration
    /// and filesystem. Never runs anything.
    pub fn count_tasks_to_run(&self) -> usize {
        match self {
            Task::Leaf(leaf) => usize::from(leaf.will_run()),
            Task::Composite(group) => group.count_tasks_to_run(),
        }
    }

    /// Find a task in this subtree by fully-qualified key.
    pub fn find(&self, qualified_key: &str) -> Option<&Task> {
        if self.qualified_key() == qualified_key {
            return Some(self);
        }
        match self {
            Task::Leaf(_) => None,
            Task::Composite(group) => group
                .children()
                .iter()
                .find_map(|child| child.find(qualified_key)),
        }
    }

    /// Whether any task in this subtree ended `Failed`.
    pub fn any_failed(&self) -> bool {
        if self.status() == TaskStatus::Failed {
            return true;
        }
        match self {
            Task::Leaf(_) => false,
            Task::Composite(group) => group.children().iter().any(Task::any_failed),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafTask> {
        match self {
            Task::Leaf(leaf) => Some(leaf),
            Task::Composite(_) => None,
        }
    }
}
