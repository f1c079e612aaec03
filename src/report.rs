// src/report.rs

//! Terminal reporter driven by task events.
//!
//! The reporter is a listener like any other: it keeps its own running set
//! and counters and never reaches into the task tree while a run is active.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::task::{Listener, StatusChange, Task, TaskEvent};
use crate::types::{TaskKind, TaskStatus};

/// Output sink of a [`Reporter`].
pub type Output = Box<dyn Write + Send>;

struct ReporterState {
    out: Output,
    interactive: bool,
    /// Qualified key -> display key of every running leaf.
    running: BTreeMap<String, String>,
    done: usize,
    failed: usize,
    total: usize,
    progress_visible: bool,
}

/// Prints per-task outcomes and, in interactive mode, a live progress line.
#[derive(Clone)]
pub struct Reporter {
    state: Arc<Mutex<ReporterState>>,
}

impl Reporter {
    pub fn new(out: Output, interactive: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ReporterState {
                out,
                interactive,
                running: BTreeMap::new(),
                done: 0,
                failed: 0,
                total: 0,
                progress_visible: false,
            })),
        }
    }

    /// Reporter writing to stdout.
    pub fn stdout(interactive: bool) -> Self {
        Self::new(Box::new(io::stdout()), interactive)
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tasks expected to run, shown as the progress denominator.
    pub fn set_total(&self, total: usize) {
        self.lock().total = total;
    }

    /// Leaves that finished (successfully or not) so far.
    pub fn done(&self) -> usize {
        self.lock().done
    }

    pub fn failed(&self) -> usize {
        self.lock().failed
    }

    /// Display keys of the leaves currently running, ordered by qualified key.
    pub fn running(&self) -> Vec<String> {
        self.lock().running.values().cloned().collect()
    }

    /// A listener feeding this reporter, for `Task::subscribe`.
    pub fn listener(&self) -> Listener {
        let reporter = self.clone();
        Arc::new(move |event: &TaskEvent| reporter.handle(event))
    }

    pub fn handle(&self, event: &TaskEvent) {
        let mut state = self.lock();
        match event {
            TaskEvent::StatusChanged(change) if change.kind == TaskKind::Leaf => {
                state.on_leaf_change(change);
            }
            TaskEvent::StatusChanged(_) => {}
            TaskEvent::Stalled { key, elapsed, .. } => {
                state.line(&format!(
                    "Warning: {key} is taking a long time ({}s)",
                    elapsed.as_secs()
                ));
            }
        }
        state.draw_progress();
    }

    /// Print the summary and the final rendered tree.
    pub fn finish(&self, root: &Task) {
        let mut state = self.lock();
        state.clear_progress();
        let summary = format!(
            "{} of {} task(s) run, {} failed",
            state.done, state.total, state.failed
        );
        state.line(&summary);
        let tree = root.render(0);
        state.line(&tree);
        let _ = state.out.flush();
    }
}

impl ReporterState {
    fn on_leaf_change(&mut self, change: &StatusChange) {
        match change.to {
            TaskStatus::Running => {
                self.running
                    .insert(change.qualified_key.clone(), change.key.clone());
            }
            TaskStatus::Success => {
                self.running.remove(&change.qualified_key);
                self.done += 1;
                self.line(&format!("Finished {}", change.key));
            }
            TaskStatus::Failed => {
                self.running.remove(&change.qualified_key);
                self.done += 1;
                self.failed += 1;
                let mut text = format!("Failed {}", change.key);
                let diagnostic = change
                    .diagnostic
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or("<no error output>");
                for line in diagnostic.lines() {
                    text.push_str("\n  ");
                    text.push_str(line);
                }
                self.line(&text);
            }
            TaskStatus::Skipped => {
                debug!(task = %change.key, "skipped");
            }
            TaskStatus::Queued => {
                self.running.remove(&change.qualified_key);
            }
        }
    }

    fn line(&mut self, text: &str) {
        self.clear_progress();
        // Terminal write errors are ignored.
        let _ = writeln!(self.out, "{text}");
    }

    fn clear_progress(&mut self) {
        if self.progress_visible {
            let _ = write!(self.out, "\r\x1b[2K");
            self.progress_visible = false;
        }
    }

    fn draw_progress(&mut self) {
        if !self.interactive {
            return;
        }
        self.clear_progress();
        let running: Vec<&str> = self.running.values().map(String::as_str).collect();
        let _ = write!(
            self.out,
            "[{}/{}] running: {}",
            self.done,
            self.total,
            running.join(", ")
        );
        let _ = self.out.flush();
        self.progress_visible = true;
    }
}
