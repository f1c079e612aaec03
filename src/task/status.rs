// src/task/status.rs

use crate::task::context::TaskIdent;
use crate::task::events::{StatusChange, TaskEvent};
use crate::types::{TaskKind, TaskStatus};

/// Current status of one task.
///
/// Status is only ever changed through [`StatusCell::transition`], which
/// hands the resulting event back to the caller to publish.
#[derive(Debug, Clone)]
pub struct StatusCell {
    status: TaskStatus,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self {
            status: TaskStatus::Queued,
        }
    }
}

impl StatusCell {
    pub fn get(&self) -> TaskStatus {
        self.status
    }

    /// Move to `to` and describe the change.
    ///
    /// Returns `None` when the status is already `to`.
    pub fn transition(
        &mut self,
        ident: &TaskIdent,
        kind: TaskKind,
        to: TaskStatus,
        diagnostic: Option<String>,
    ) -> Option<TaskEvent> {
        let from = self.status;
        if from == to {
            return None;
        }
        self.status = to;

        Some(TaskEvent::StatusChanged(StatusChange {
            key: ident.key.clone(),
            qualified_key: ident.qualified_key.clone(),
            kind,
            from,
            to,
            diagnostic: if to == TaskStatus::Failed {
                diagnostic
            } else {
                None
            },
        }))
    }
}

/// Status of a composite whose children have all settled.
///
/// - `Skipped` if every child was skipped (including a group with no children),
/// - otherwise `Success` if no child failed,
/// - otherwise `Failed`.
pub fn aggregate_status<I>(children: I) -> TaskStatus
where
    I: IntoIterator<Item = TaskStatus>,
{
    let mut all_skipped = true;
    let mut any_failed = false;

    for status in children {
        all_skipped &= status == TaskStatus::Skipped;
        any_failed |= status == TaskStatus::Failed;
    }

    if all_skipped {
        TaskStatus::Skipped
    } else if any_failed {
        TaskStatus::Failed
    } else {
        TaskStatus::Success
    }
}
