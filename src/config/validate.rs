// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile, RawTaskNode};
use crate::errors::{IgniterError, Result};
use crate::task::context::validate_task_name;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = IgniterError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.settings, raw.task))
    }
}

/// Check the settings and every node of the task tree.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_settings(cfg)?;
    validate_node(&cfg.task, &cfg.task.name)
}

fn validate_settings(cfg: &RawConfigFile) -> Result<()> {
    if cfg.settings.stall_timeout_secs == 0 {
        return Err(IgniterError::ConfigError(
            "[settings].stall_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.settings.cache_file.trim().is_empty() {
        return Err(IgniterError::ConfigError(
            "[settings].cache_file must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_node(node: &RawTaskNode, path: &str) -> Result<()> {
    validate_task_name(&node.name)?;

    match (&node.cmd, &node.tasks) {
        (Some(_), Some(_)) => {
            return Err(IgniterError::ConfigError(format!(
                "task '{path}' has both `cmd` and `tasks`; a task is either a command or a group"
            )));
        }
        (None, None) => {
            return Err(IgniterError::ConfigError(format!(
                "task '{path}' needs either `cmd` or `tasks`"
            )));
        }
        (Some(cmd), None) => {
            if node.concurrent.is_some() {
                return Err(IgniterError::ConfigError(format!(
                    "task '{path}': `concurrent` is only valid on groups"
                )));
            }
            let cmds = cmd.as_slice();
            if cmds.is_empty() || cmds.iter().any(|c| c.trim().is_empty()) {
                return Err(IgniterError::ConfigError(format!(
                    "task '{path}': `cmd` must not be empty"
                )));
            }
        }
        (None, Some(children)) => {
            if node.inputs.is_some() || node.outputs.is_some() {
                return Err(IgniterError::ConfigError(format!(
                    "task '{path}': `inputs`/`outputs` are only valid on command tasks"
                )));
            }

            let mut seen = HashSet::new();
            for child in children {
                if !seen.insert(child.name.as_str()) {
                    return Err(IgniterError::ConfigError(format!(
                        "group '{path}' has more than one child named '{}'",
                        child.name
                    )));
                }
                validate_node(child, &format!("{path}:{}", child.name))?;
            }
        }
    }

    Ok(())
}
