// tests/config_loading.rs

use std::fs;
use std::time::Duration;

use igniter::config::{CommandList, find_config_path, load_and_validate, load_from_path};
use igniter::errors::IgniterError;
use igniter::task::Task;
use igniter::types::{ConcurrencyMode, KeyDisplay};
use igniter_test_utils::builders::ConfigurationBuilder;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("igniter.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

const PROJECT: &str = r#"
[settings]
stall_timeout_secs = 5
nested_keys = true

[task]
name = "project"
concurrent = true

[[task.tasks]]
name = "build"
cmd = ["cargo build", "cargo doc"]
inputs = ["src"]
outputs = ["target"]

[[task.tasks]]
name = "lint"
cmd = "cargo clippy"
"#;

#[test]
fn test_load_full_project() {
    let (_dir, path) = write_config(PROJECT);
    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.settings.stall_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.settings.key_display(), KeyDisplay::Nested);
    assert_eq!(cfg.settings.cache_file, ".igniter/cache.json");

    let children = cfg.task.tasks.as_ref().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(
        children[1].cmd,
        Some(CommandList::One("cargo clippy".to_string()))
    );
    assert_eq!(children[0].cmd.as_ref().unwrap().as_slice().len(), 2);
}

#[test]
fn test_converted_tree_has_expected_shape() {
    let (_dir, path) = write_config(PROJECT);
    let cfg = load_and_validate(&path).unwrap();

    let root = ConfigurationBuilder::new().bind(cfg.to_task_spec());
    let Task::Composite(group) = &root else {
        panic!("root should be a group");
    };
    assert_eq!(group.mode(), ConcurrencyMode::Concurrent);
    assert_eq!(group.children().len(), 2);
    assert!(root.find("project:build").is_some());
    assert!(root.find("project:lint").is_some());
}

#[test]
fn test_settings_are_optional() {
    let (_dir, path) = write_config(
        r#"
[task]
name = "only"
cmd = "true"
"#,
    );
    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.settings.stall_timeout_secs, 60);
    assert_eq!(cfg.settings.key_display(), KeyDisplay::Flat);
}

fn expect_config_error(contents: &str) -> String {
    let (_dir, path) = write_config(contents);
    match load_and_validate(&path) {
        Err(IgniterError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_node_needs_cmd_or_tasks() {
    let msg = expect_config_error(
        r#"
[task]
name = "root"
"#,
    );
    assert!(msg.contains("either `cmd` or `tasks`"), "{msg}");
}

#[test]
fn test_node_cannot_have_both_cmd_and_tasks() {
    let msg = expect_config_error(
        r#"
[task]
name = "root"
cmd = "true"
tasks = []
"#,
    );
    assert!(msg.contains("both"), "{msg}");
}

#[test]
fn test_duplicate_sibling_names_rejected() {
    let msg = expect_config_error(
        r#"
[task]
name = "root"
[[task.tasks]]
name = "a"
cmd = "true"
[[task.tasks]]
name = "a"
cmd = "false"
"#,
    );
    assert!(msg.contains("more than one child named 'a'"), "{msg}");
}

#[test]
fn test_separator_in_name_rejected() {
    expect_config_error(
        r#"
[task]
name = "root"
[[task.tasks]]
name = "a.b"
cmd = "true"
"#,
    );
}

#[test]
fn test_concurrent_on_leaf_rejected() {
    let msg = expect_config_error(
        r#"
[task]
name = "root"
cmd = "true"
concurrent = true
"#,
    );
    assert!(msg.contains("only valid on groups"), "{msg}");
}

#[test]
fn test_inputs_on_group_rejected() {
    let msg = expect_config_error(
        r#"
[task]
name = "root"
inputs = ["src"]
[[task.tasks]]
name = "a"
cmd = "true"
"#,
    );
    assert!(msg.contains("only valid on command tasks"), "{msg}");
}

#[test]
fn test_zero_stall_timeout_rejected() {
    expect_config_error(
        r#"
[settings]
stall_timeout_secs = 0
[task]
name = "root"
cmd = "true"
"#,
    );
}

#[test]
fn test_empty_command_rejected() {
    expect_config_error(
        r#"
[task]
name = "root"
cmd = []
"#,
    );
}

#[test]
fn test_unknown_field_is_a_toml_error() {
    let (_dir, path) = write_config(
        r#"
[task]
name = "root"
cmd = "true"
after = ["x"]
"#,
    );
    assert!(matches!(
        load_from_path(&path),
        Err(IgniterError::TomlError(_))
    ));
}

#[test]
fn test_find_config_walks_up() {
    let (dir, path) = write_config(
        r#"
[task]
name = "root"
cmd = "true"
"#,
    );
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_config_path(&nested), Some(path));
}

#[test]
fn test_find_config_returns_none_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = find_config_path(dir.path());
    // Only a stray igniter.toml above the temp dir could be found.
    assert!(candidate.map_or(true, |p| !p.starts_with(dir.path())));
}
