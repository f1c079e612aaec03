// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod task;
pub mod types;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::CacheFile;
use crate::cli::CliArgs;
use crate::config::loader::{CONFIG_FILE_NAME, config_root_dir, find_config_path, load_and_validate};
use crate::errors::{IgniterError, Result};
use crate::exec::Pool;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::Reporter;
use crate::task::{Configuration, Task};
use crate::types::{KeyDisplay, TaskStatus};

/// What a completed (non-aborted) run looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Final status of the root task.
    pub status: TaskStatus,
    /// Whether any task in the tree ended `Failed`.
    pub any_failed: bool,
}

impl RunSummary {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.any_failed { 1 } else { 0 }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config discovery and loading
/// - cache, worker pool and run configuration
/// - binding the task tree and attaching the reporter
pub async fn run(args: CliArgs) -> Result<RunSummary> {
    let config_path = resolve_config_path(&args)?;
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);
    debug!(config = ?config_path, root = ?root_dir, "loaded configuration");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cache = if args.no_cache {
        None
    } else {
        Some(CacheFile::open(
            Arc::clone(&fs),
            root_dir.join(&cfg.settings.cache_file),
        ))
    };

    let stall_after = args
        .stall_timeout()
        .unwrap_or_else(|| cfg.settings.stall_timeout());
    let pool = Pool::new(args.worker_count(), Some(stall_after));

    let key_display = if args.nested_keys {
        KeyDisplay::Nested
    } else {
        cfg.settings.key_display()
    };

    let mut configuration = Configuration::new(pool)
        .with_debug(args.debug)
        .with_dry_run(args.dry_run)
        .with_filters(args.filter_rules()?)
        .with_key_display(key_display)
        .with_root_dir(root_dir)
        .with_fs(fs);
    if let Some(cache) = &cache {
        configuration = configuration.with_cache(cache.shared());
    }

    let mut root = cfg.to_task_spec().bind(Arc::new(configuration))?;

    let interactive = !args.no_tty && std::io::stdout().is_terminal();
    let reporter = Reporter::stdout(interactive);

    run_tree(&mut root, &reporter, cache.as_ref()).await
}

/// Run a bound tree to completion, reporting through `reporter`.
///
/// The cache (if any) is saved once after every task has settled. It is
/// not saved when the run aborts.
pub async fn run_tree(
    root: &mut Task,
    reporter: &Reporter,
    cache: Option<&CacheFile>,
) -> Result<RunSummary> {
    root.subscribe(reporter.listener());
    reporter.set_total(root.count_tasks_to_run());

    let outcome = root.run().await;
    reporter.finish(root);
    outcome?;

    if let Some(cache) = cache {
        cache.save()?;
    }

    let summary = RunSummary {
        status: root.status(),
        any_failed: root.any_failed(),
    };
    info!(status = %summary.status, any_failed = summary.any_failed, "run complete");
    Ok(summary)
}

fn resolve_config_path(args: &CliArgs) -> Result<PathBuf> {
    if let Some(path) = &args.config {
        return Ok(path.clone());
    }
    let cwd = std::env::current_dir()?;
    find_config_path(&cwd).ok_or_else(|| {
        IgniterError::ConfigError(format!(
            "no {CONFIG_FILE_NAME} found in {} or any parent directory",
            cwd.display()
        ))
    })
}
