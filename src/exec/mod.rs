// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`pool`] bounds how many process-spawning jobs run at once and reports
//!   start / stall / finish signals for each job.
//! - [`command`] runs a single shell command with `tokio::process::Command`
//!   and captures its stderr for failure diagnostics.

pub mod command;
pub mod pool;

pub use command::run_shell_command;
pub use pool::{JobHandle, JobSignal, JobState, Pool};
