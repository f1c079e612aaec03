// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `-i/--invert` applies to the `-f/--filter` right before it, so the
//! pairing is recovered from argument positions after clap has parsed.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::errors::{self, IgniterError};
use crate::task::FilterRule;

/// Command-line arguments for `igniter`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "igniter",
    version,
    about = "Run a tree of tasks, skipping the ones whose inputs have not changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: the nearest `igniter.toml` in this or a parent directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of commands running at once.
    ///
    /// Default: the number of available CPUs.
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Only run tasks whose qualified key (`root:group:task`) matches REGEX.
    ///
    /// Repeatable; every filter must allow a task for it to run.
    #[arg(short = 'f', long = "filter", value_name = "REGEX")]
    pub filter: Vec<String>,

    /// Invert the `--filter` given just before this flag.
    #[arg(short = 'i', long, action = ArgAction::Count)]
    pub invert: u8,

    /// Ignore the cache: run everything and do not record fingerprints.
    #[arg(long)]
    pub no_cache: bool,

    /// Plain line-by-line output, no live progress line.
    #[arg(long)]
    pub no_tty: bool,

    /// Walk the task tree and mark every task as skipped.
    #[arg(long)]
    pub dry_run: bool,

    /// Abort the whole run on the first failing task.
    #[arg(long)]
    pub debug: bool,

    /// Display task keys as `parent.child` instead of the bare name.
    #[arg(long)]
    pub nested_keys: bool,

    /// Seconds before a running command is reported as taking long.
    ///
    /// Overrides `[settings].stall_timeout_secs`.
    #[arg(long, value_name = "SECS")]
    pub stall_timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `IGNITER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Filters paired with their invert flag.
    #[arg(skip)]
    pub filters: Vec<FilterArg>,
}

/// A `--filter` pattern and whether `--invert` followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub pattern: String,
    pub invert: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Worker count, falling back to the available parallelism.
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1)
            })
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout.map(Duration::from_secs)
    }

    /// Compile the filters. An invalid regex is a configuration error.
    pub fn filter_rules(&self) -> errors::Result<Vec<FilterRule>> {
        self.filters
            .iter()
            .map(|f| FilterRule::new(&f.pattern, f.invert))
            .collect()
    }

    fn from_matches(matches: &ArgMatches) -> errors::Result<Self> {
        let mut args = CliArgs::from_arg_matches(matches)
            .map_err(|e| IgniterError::ConfigError(e.to_string()))?;
        args.filters = pair_filters(matches)?;
        Ok(args)
    }
}

fn pair_filters(matches: &ArgMatches) -> errors::Result<Vec<FilterArg>> {
    let patterns: Vec<(usize, String)> = match (
        matches.indices_of("filter"),
        matches.get_many::<String>("filter"),
    ) {
        (Some(indices), Some(values)) => indices.zip(values.cloned()).collect(),
        _ => Vec::new(),
    };

    let mut filters: Vec<FilterArg> = patterns
        .iter()
        .map(|(_, pattern)| FilterArg {
            pattern: pattern.clone(),
            invert: false,
        })
        .collect();

    for invert_at in matches.indices_of("invert").into_iter().flatten() {
        let preceding = patterns.iter().rposition(|(at, _)| *at < invert_at);
        match preceding {
            Some(pos) => filters[pos].invert = true,
            None => {
                return Err(IgniterError::ConfigError(
                    "`--invert` must follow a `--filter`".to_string(),
                ));
            }
        }
    }

    Ok(filters)
}

/// Parse `std::env::args`, exiting on `--help`, `--version` and usage errors.
pub fn parse() -> errors::Result<CliArgs> {
    let matches = CliArgs::command().get_matches();
    CliArgs::from_matches(&matches)
}

/// Parse an explicit argument list (the first item is the binary name).
pub fn try_parse_from<I, T>(itr: I) -> errors::Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = CliArgs::command()
        .try_get_matches_from(itr)
        .map_err(|e| IgniterError::ConfigError(e.to_string()))?;
    CliArgs::from_matches(&matches)
}
