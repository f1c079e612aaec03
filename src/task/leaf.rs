// src/task/leaf.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{fingerprint_paths, lock_cache};
use crate::errors::{ExecutionError, IgniterError, Result};
use crate::exec::{JobSignal, run_shell_command};
use crate::task::context::{Configuration, TaskIdent, filters_allow};
use crate::task::events::{Listener, Listeners, TaskEvent};
use crate::task::spec::{Action, SkipPolicy};
use crate::task::status::StatusCell;
use crate::types::{TaskKind, TaskStatus};

/// Why a leaf was not executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DryRun,
    Filtered,
    /// Watched paths match the fingerprint recorded after the last success.
    UpToDate,
    /// The custom predicate returned `false`.
    Predicate,
}

/// A single unit of work.
#[derive(Debug)]
pub struct LeafTask {
    ident: TaskIdent,
    action: Action,
    skip: Option<SkipPolicy>,
    config: Arc<Configuration>,
    status: StatusCell,
    diagnostic: Option<String>,
    listeners: Listeners,
}

impl LeafTask {
    pub(crate) fn new(
        ident: TaskIdent,
        action: Action,
        skip: Option<SkipPolicy>,
        config: Arc<Configuration>,
    ) -> Self {
        Self {
            ident,
            action,
            skip,
            config,
            status: StatusCell::default(),
            diagnostic: None,
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

    /// Output captured from the last failure (usually stderr).
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn set_status(&mut self, to: TaskStatus) {
        let diagnostic = self.diagnostic.clone();
        if let Some(event) = self.status.transition(&self.ident, TaskKind::Leaf, to, diagnostic) {
            self.listeners.publish(&event);
        }
    }

    fn watched_paths(&self) -> Vec<PathBuf> {
        self.skip
            .as_ref()
            .map(SkipPolicy::watched_paths)
            .unwrap_or_default()
            .iter()
            .map(|p| self.config.resolve(p))
            .collect()
    }

    /// Decide whether this leaf should be skipped, without running it.
    ///
    /// Only a failing custom predicate produces an error.
    pub fn skip_reason(&self) -> Result<Option<SkipReason>> {
        if self.config.dry_run {
            return Ok(Some(SkipReason::DryRun));
        }

        if !filters_allow(&self.config.filters, &self.ident.qualified_key) {
            return Ok(Some(SkipReason::Filtered));
        }

        match &self.skip {
            None => Ok(None),
            Some(SkipPolicy::Fingerprint { .. }) => {
                Ok(self.is_up_to_date().then_some(SkipReason::UpToDate))
            }
            Some(SkipPolicy::Predicate(predicate)) => match predicate() {
                Ok(true) => Ok(None),
                Ok(false) => Ok(Some(SkipReason::Predicate)),
                Err(err) => Err(IgniterError::Predicate {
                    key: self.ident.qualified_key.clone(),
                    message: format!("{err:#}"),
                }),
            },
        }
    }

    /// Best-effort guess used to size progress output.
    pub fn will_run(&self) -> bool {
        !matches!(self.skip_reason(), Ok(Some(_)))
    }

    fn is_up_to_date(&self) -> bool {
        let Some(cache) = &self.config.cache else {
            return false;
        };

        let paths = self.watched_paths();
        if paths.is_empty() {
            return false;
        }

        let fs = self.config.fs.as_ref();
        if let Some(missing) = paths.iter().find(|p| !fs.exists(p)) {
            debug!(task = %self.ident.qualified_key, path = ?missing, "watched path missing; must run");
            return false;
        }

        let stored = lock_cache(cache)
            .get(&self.ident.qualified_key)
            .map(str::to_owned);
        let Some(stored) = stored else {
            debug!(task = %self.ident.qualified_key, "no recorded fingerprint; must run");
            return false;
        };

        match fingerprint_paths(fs, &paths) {
            Ok(current) => current == stored,
            Err(err) => {
                warn!(task = %self.ident.qualified_key, error = %err, "could not fingerprint watched paths; must run");
                false
            }
        }
    }

    /// Run this leaf: skip it, or execute its action and record the outcome.
    ///
    /// A failing action is contained (status `Failed`) unless debug mode is
    /// on, in which case the failure is returned as a fatal error and the
    /// status is left as is.
    pub async fn run(&mut self) -> Result<()> {
        if let Some(reason) = self.skip_reason()? {
            debug!(task = %self.ident.qualified_key, ?reason, "skipping task");
            self.set_status(TaskStatus::Skipped);
            return Ok(());
        }

        match self.execute().await {
            Ok(()) => {
                info!(task = %self.ident.qualified_key, "task succeeded");
                self.set_status(TaskStatus::Success);
                self.record_fingerprint();
                Ok(())
            }
            Err(err) => {
                self.diagnostic = err.diagnostic().map(str::to_owned);

                if self.config.debug {
                    error!(task = %self.ident.qualified_key, error = %err, "task failed in debug mode; aborting run");
                    return Err(IgniterError::Execution {
                        key: self.ident.qualified_key.clone(),
                        source: err,
                    });
                }

                warn!(task = %self.ident.qualified_key, error = %err, "task failed");
                self.set_status(TaskStatus::Failed);
                Ok(())
            }
        }
    }

    async fn execute(&mut self) -> std::result::Result<(), ExecutionError> {
        match self.action.clone() {
            Action::Custom(executor) => {
                self.set_status(TaskStatus::Running);
                executor().await
            }
            Action::Commands(cmds) => {
                for (index, cmd) in cmds.into_iter().enumerate() {
                    // Back to queued while the next command waits for a slot.
                    if index > 0 {
                        self.set_status(TaskStatus::Queued);
                    }
                    let job = run_shell_command(cmd, self.config.root_dir.clone());
                    let mut handle = self.config.pool.submit(self.ident.qualified_key.clone(), job);

                    while let Some(signal) = handle.next_signal().await {
                        match signal {
                            JobSignal::Started => self.set_status(TaskStatus::Running),
                            JobSignal::StillRunning { elapsed } => {
                                self.listeners.publish(&TaskEvent::Stalled {
                                    key: self.ident.key.clone(),
                                    qualified_key: self.ident.qualified_key.clone(),
                                    elapsed,
                                });
                            }
                            JobSignal::Finished(outcome) => outcome?,
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Store the fingerprint of the watched paths after a success.
    fn record_fingerprint(&self) {
        let Some(cache) = &self.config.cache else {
            return;
        };
        let paths = self.watched_paths();
        if paths.is_empty() {
            return;
        }

        match fingerprint_paths(self.config.fs.as_ref(), &paths) {
            Ok(fingerprint) => {
                lock_cache(cache).set(self.ident.qualified_key.clone(), fingerprint);
            }
            Err(err) => {
                warn!(task = %self.ident.qualified_key, error = %err, "could not fingerprint watched paths; cache entry left unchanged");
            }
        }
    }

    pub fn render(&self, depth: usize) -> String {
        let indent = "  ".repeat(depth);
        let status = self.status();
        let mut out = format!("{indent}{} {}", status.symbol(), self.ident.key);

        if status == TaskStatus::Failed {
            let diagnostic = self
                .diagnostic
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("<no error output>");
            for line in diagnostic.lines() {
                out.push('\n');
                out.push_str(&indent);
                out.push_str("  ");
                out.push_str(line);
            }
        }

        out
    }
}
