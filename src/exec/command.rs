// src/exec/command.rs

//! Shell command execution for process leaves.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::ExecutionError;

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` through the shell in `cwd` and wait for it to exit.
///
/// Stdout is drained and logged at debug level. Stderr is captured and
/// returned as the diagnostic when the command fails.
pub async fn run_shell_command(cmd: String, cwd: PathBuf) -> Result<(), ExecutionError> {
    info!(cmd = %cmd, cwd = ?cwd, "starting process");

    let mut command = shell_command(&cmd);
    command
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| ExecutionError::Spawn {
        command: cmd.clone(),
        message: e.to_string(),
    })?;

    if let Some(stdout) = child.stdout.take() {
        let log_cmd = cmd.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %log_cmd, "stdout: {}", line);
            }
        });
    }

    let stderr_reader = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            // Keep whatever was read even if the pipe errors part way.
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let status = child.wait().await.map_err(|e| ExecutionError::Spawn {
        command: cmd.clone(),
        message: format!("waiting for process: {e}"),
    })?;

    let stderr = match stderr_reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    info!(
        cmd = %cmd,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "process exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(ExecutionError::Exit {
            command: cmd,
            code: status.code(),
            stderr: stderr.trim_end().to_string(),
        })
    }
}
