use std::fmt;

/// Lifecycle status of a task.
///
/// Leaves move `Queued -> Running -> {Success, Failed}` or straight from
/// `Queued` to `Skipped`. A composite's status is derived from its children
/// once they have all settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Not started yet. For a group, no child has started.
    Queued,
    /// Currently running. For a group, it has been dispatched.
    Running,
    Success,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// `Success`, `Failed` and `Skipped` never change again within a run.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Glyph used by `render`.
    pub fn symbol(self) -> &'static str {
        match self {
            TaskStatus::Queued => "—",
            TaskStatus::Running => "⊙",
            TaskStatus::Success => "✓",
            TaskStatus::Failed => "✖",
            TaskStatus::Skipped => "↪",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Discriminant of the two task variants, carried on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Leaf,
    Composite,
}

/// How a composite dispatches its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Children run strictly one after another, in order.
    #[default]
    Sequential,
    /// All children start together; the group settles when all have.
    Concurrent,
}

/// How task keys are displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDisplay {
    /// Just the task's own name.
    #[default]
    Flat,
    /// Ancestor names joined with `.` (e.g. `build.instruments.efb`).
    Nested,
}
