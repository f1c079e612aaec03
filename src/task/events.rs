// src/task/events.rs

//! Observer protocol for task status changes.
//!
//! Listeners are plain callbacks invoked synchronously, in the order the
//! transitions happen. Subscribing on a composite subscribes its whole
//! subtree, so one listener on the root sees every event of a run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::types::{TaskKind, TaskStatus};

/// Callback registered through `Task::subscribe`.
///
/// Listeners must not panic; the engine does not guard against it.
pub type Listener = Arc<dyn Fn(&TaskEvent) + Send + Sync>;

/// One status transition of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Display key (depends on the key display mode).
    pub key: String,
    /// Fully-qualified key (`root:group:leaf`).
    pub qualified_key: String,
    pub kind: TaskKind,
    pub from: TaskStatus,
    pub to: TaskStatus,
    /// Captured failure output, only set on a transition to `Failed`.
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    StatusChanged(StatusChange),
    /// A pool job of this leaf has been running for `elapsed` and is still
    /// going. Advisory; the job is not interrupted.
    Stalled {
        /// Display key.
        key: String,
        qualified_key: String,
        elapsed: Duration,
    },
}

impl TaskEvent {
    /// The status change carried by this event, if any.
    pub fn status_change(&self) -> Option<&StatusChange> {
        match self {
            TaskEvent::StatusChanged(change) => Some(change),
            TaskEvent::Stalled { .. } => None,
        }
    }
}

/// Listeners registered on a single task.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Vec<Listener>,
}

impl Listeners {
    pub fn push(&mut self, listener: Listener) {
        self.inner.push(listener);
    }

    pub fn publish(&self, event: &TaskEvent) {
        for listener in &self.inner {
            listener(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.len())
            .finish()
    }
}
