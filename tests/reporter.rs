// tests/reporter.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use igniter::report::Reporter;
use igniter::task::{StatusChange, TaskEvent, TaskSpec};
use igniter::types::{TaskKind, TaskStatus};
use igniter_test_utils::builders::ConfigurationBuilder;
use igniter_test_utils::fake_executor::ExecutionLog;
use igniter_test_utils::recorder::SharedBuffer;
use igniter_test_utils::with_timeout;

fn change(key: &str, kind: TaskKind, from: TaskStatus, to: TaskStatus) -> TaskEvent {
    TaskEvent::StatusChanged(StatusChange {
        key: key.to_string(),
        qualified_key: format!("root:{key}"),
        kind,
        from,
        to,
        diagnostic: None,
    })
}

#[test]
fn test_tracks_running_set_and_counts() {
    let buffer = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), false);
    reporter.set_total(2);

    reporter.handle(&change("a", TaskKind::Leaf, TaskStatus::Queued, TaskStatus::Running));
    reporter.handle(&change("b", TaskKind::Leaf, TaskStatus::Queued, TaskStatus::Running));
    assert_eq!(reporter.running(), vec!["a", "b"]);

    reporter.handle(&change("a", TaskKind::Leaf, TaskStatus::Running, TaskStatus::Success));
    assert_eq!(reporter.running(), vec!["b"]);
    assert_eq!(reporter.done(), 1);

    // Group transitions are not counted.
    reporter.handle(&change("grp", TaskKind::Composite, TaskStatus::Running, TaskStatus::Success));
    assert_eq!(reporter.done(), 1);

    assert_eq!(buffer.contents(), "Finished a\n");
}

#[test]
fn test_failed_line_includes_indented_diagnostic() {
    let buffer = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), false);

    reporter.handle(&TaskEvent::StatusChanged(StatusChange {
        key: "lint".to_string(),
        qualified_key: "root:lint".to_string(),
        kind: TaskKind::Leaf,
        from: TaskStatus::Running,
        to: TaskStatus::Failed,
        diagnostic: Some("first\nsecond".to_string()),
    }));
    reporter.handle(&change("empty", TaskKind::Leaf, TaskStatus::Running, TaskStatus::Failed));

    assert_eq!(
        buffer.contents(),
        "Failed lint\n  first\n  second\nFailed empty\n  <no error output>\n"
    );
    assert_eq!(reporter.failed(), 2);
}

#[test]
fn test_stall_warning() {
    let buffer = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), false);

    reporter.handle(&TaskEvent::Stalled {
        key: "build".to_string(),
        qualified_key: "root:build".to_string(),
        elapsed: Duration::from_secs(90),
    });

    assert_eq!(
        buffer.contents(),
        "Warning: build is taking a long time (90s)\n"
    );
}

#[test]
fn test_interactive_mode_draws_progress() {
    let buffer = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), true);
    reporter.set_total(3);

    reporter.handle(&change("a", TaskKind::Leaf, TaskStatus::Queued, TaskStatus::Running));

    assert!(buffer.contents().ends_with("[0/3] running: a"));
}

#[tokio::test]
async fn test_finish_prints_summary_and_tree() {
    let log = ExecutionLog::new();
    let mut root = ConfigurationBuilder::new().bind(TaskSpec::concurrent(
        "root",
        vec![log.succeeding("a"), log.failing("b", "nope")],
    ));
    let buffer = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), false);
    root.subscribe(reporter.listener());
    reporter.set_total(root.count_tasks_to_run());

    with_timeout(root.run()).await.unwrap();
    reporter.finish(&root);

    let out = buffer.contents();
    assert!(out.contains("Finished a\n"));
    assert!(out.contains("Failed b\n  nope\n"));
    assert!(out.contains("2 of 2 task(s) run, 1 failed\n"));
    assert!(out.ends_with("✖ root\n  ✓ a\n  ✖ b\n    nope\n"));
}

#[tokio::test]
async fn test_same_named_leaves_in_different_groups_are_tracked_apart() {
    let log = ExecutionLog::new();
    let mut root = ConfigurationBuilder::new().bind(TaskSpec::concurrent(
        "root",
        vec![
            TaskSpec::sequential("x", vec![log.sleeping("build", Duration::from_millis(10))]),
            TaskSpec::sequential("y", vec![log.sleeping("build", Duration::from_millis(150))]),
        ],
    ));
    let reporter = Reporter::new(Box::new(SharedBuffer::new()), false);
    root.subscribe(reporter.listener());

    // Snapshot the running set right after the reporter saw each leaf event.
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    {
        let snapshots = Arc::clone(&snapshots);
        let reporter = reporter.clone();
        root.subscribe(Arc::new(move |event: &TaskEvent| {
            if let Some(change) = event.status_change() {
                if change.kind == TaskKind::Leaf {
                    snapshots.lock().unwrap().push((
                        change.qualified_key.clone(),
                        change.to,
                        reporter.running(),
                    ));
                }
            }
        }));
    }

    with_timeout(root.run()).await.unwrap();

    let snapshots = snapshots.lock().unwrap().clone();
    let running_after = |qualified_key: &str, status: TaskStatus| {
        snapshots
            .iter()
            .find(|(key, to, _)| key == qualified_key && *to == status)
            .map(|(_, _, running)| running.clone())
    };
    assert_eq!(
        running_after("root:x:build", TaskStatus::Success),
        Some(vec!["build".to_string()])
    );
    assert_eq!(running_after("root:y:build", TaskStatus::Success), Some(vec![]));
    assert!(reporter.running().is_empty());
    assert_eq!(reporter.done(), 2);
}

#[test]
fn test_requeued_leaf_leaves_the_running_set() {
    let reporter = Reporter::new(Box::new(SharedBuffer::new()), false);

    reporter.handle(&change("steps", TaskKind::Leaf, TaskStatus::Queued, TaskStatus::Running));
    reporter.handle(&change("steps", TaskKind::Leaf, TaskStatus::Running, TaskStatus::Queued));

    assert!(reporter.running().is_empty());
    assert_eq!(reporter.done(), 0);
}
