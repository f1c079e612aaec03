// src/errors.rs

//! Crate-wide error types and aliases.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgniterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cache serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A leaf's action failed and debug mode promoted it to a fatal abort.
    #[error("task '{key}' failed: {source}")]
    Execution {
        key: String,
        #[source]
        source: ExecutionError,
    },

    /// A custom skip predicate failed. Always fatal.
    #[error("skip predicate of task '{key}' failed: {message}")]
    Predicate { key: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IgniterError {
    /// Whether this error aborted a run that was already executing tasks.
    pub fn is_fatal_abort(&self) -> bool {
        matches!(
            self,
            IgniterError::Execution { .. } | IgniterError::Predicate { .. }
        )
    }
}

/// Failure of a single unit of work (a shell command or a custom executor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("could not spawn `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` exited with {}", exit_code_label(*.code))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{message}")]
    Failed {
        message: String,
        diagnostic: Option<String>,
    },

    #[error("job ended without reporting an outcome")]
    Abandoned,
}

impl ExecutionError {
    /// Failure with a plain message and no captured output.
    pub fn msg(message: impl Into<String>) -> Self {
        ExecutionError::Failed {
            message: message.into(),
            diagnostic: None,
        }
    }

    /// Text shown underneath a failed task (usually captured stderr).
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ExecutionError::Exit { stderr, .. } => Some(stderr.as_str()),
            ExecutionError::Spawn { message, .. } => Some(message.as_str()),
            ExecutionError::Failed { diagnostic, .. } => diagnostic.as_deref(),
            ExecutionError::Abandoned => None,
        }
    }
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, IgniterError>;
