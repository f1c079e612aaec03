// src/task/composite.rs

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::task::Task;
use crate::task::context::{Configuration, TaskIdent};
use crate::task::events::{Listener, Listeners};
use crate::task::status::{StatusCell, aggregate_status};
use crate::types::{ConcurrencyMode, TaskKind, TaskStatus};

/// Ordered group of child tasks.
#[derive(Debug)]
pub struct CompositeTask {
    ident: TaskIdent,
    mode: ConcurrencyMode,
    children: Vec<Task>,
    config: Arc<Configuration>,
    status: StatusCell,
    listeners: Listeners,
}

impl CompositeTask {
    pub(crate) fn new(
        ident: TaskIdent,
        mode: ConcurrencyMode,
        children: Vec<Task>,
        config: Arc<Configuration>,
    ) -> Self {
        Self {
            ident,
            mode,
            children,
            config,
            status: StatusCell::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.ident.name
    }

    pub fn key(&self) -> &str {
        &self.ident.key
    }

    pub fn qualified_key(&self) -> &str {
        &self.ident.qualified_key
    }

    pub fn status(&self) -> TaskStatus {
        self.status.get()
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    pub fn children(&self) -> &[Task] {
        &self.children
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Register `listener` on this group and every descendant.
    pub fn subscribe(&mut self, listener: Listener) {
        for child in &mut self.children {
            child.subscribe(Arc::clone(&listener));
        }
        self.listeners.push(listener);
    }

    fn set_status(&mut self, to: TaskStatus) {
        if let Some(event) = self.status.transition(&self.ident, TaskKind::Composite, to, None) {
            self.listeners.publish(&event);
        }
    }

    /// Run the children according to the group's mode.
    ///
    /// A fatal error from a child marks this group `Failed` and is returned
    /// once every already-started child has settled. Otherwise the group's
    /// status is aggregated from its children.
    pub async fn run(&mut self) -> Result<()> {
        debug!(task = %self.ident.qualified_key, mode = ?self.mode, children = self.children.len(), "starting group");
        self.set_status(TaskStatus::Running);

        let outcome = match self.mode {
            ConcurrencyMode::Sequential => self.run_sequentially().await,
            ConcurrencyMode::Concurrent => self.run_concurrently().await,
        };

        match outcome {
            Ok(()) => {
                let status = aggregate_status(self.children.iter().map(Task::status));
                debug!(task = %self.ident.qualified_key, %status, "group settled");
                self.set_status(status);
                Ok(())
            }
            Err(err) => {
                self.set_status(TaskStatus::Failed);
                Err(err)
            }
        }
    }

    async fn run_sequentially(&mut self) -> Result<()> {
        for child in &mut self.children {
            child.run().await?;
        }
        Ok(())
    }

    async fn run_concurrently(&mut self) -> Result<()> {
        let results = join_all(self.children.iter_mut().map(Task::run)).await;

        let mut fatal = None;
        for err in results.into_iter().filter_map(|r| r.err()) {
            if fatal.is_none() {
                fatal = Some(err);
            } else {
                warn!(task = %self.ident.qualified_key, error = %err, "further fatal failure in group");
            }
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn count_tasks_to_run(&self) -> usize {
        self.children.iter().map(Task::count_tasks_to_run).sum()
    }

    pub fn render(&self, depth: usize) -> String {
        let indent = "  ".repeat(depth);
        let mut lines = vec![format!(
            "{indent}{} {}",
            self.status().symbol(),
            self.ident.key
        )];
        lines.extend(self.children.iter().map(|child| child.render(depth + 1)));
        lines.join("\n")
    }
}
