// tests/cli_args.rs

use std::path::PathBuf;
use std::time::Duration;

use igniter::cli::{FilterArg, try_parse_from};
use igniter::errors::IgniterError;

#[test]
fn test_defaults() {
    let args = try_parse_from(["igniter"]).unwrap();

    assert_eq!(args.config, None);
    assert!(args.filters.is_empty());
    assert!(!args.debug && !args.dry_run && !args.no_cache && !args.no_tty);
    assert!(args.worker_count() >= 1);
    assert_eq!(args.stall_timeout(), None);
}

#[test]
fn test_invert_applies_to_preceding_filter() {
    let args = try_parse_from([
        "igniter", "-f", "build", "-f", "docs", "-i", "--filter", "app",
    ])
    .unwrap();

    assert_eq!(
        args.filters,
        vec![
            FilterArg { pattern: "build".to_string(), invert: false },
            FilterArg { pattern: "docs".to_string(), invert: true },
            FilterArg { pattern: "app".to_string(), invert: false },
        ]
    );

    let rules = args.filter_rules().unwrap();
    assert!(rules[1].is_inverted());
}

#[test]
fn test_invert_without_filter_is_rejected() {
    let err = try_parse_from(["igniter", "-i", "-f", "build"]).unwrap_err();
    assert!(matches!(err, IgniterError::ConfigError(_)));
}

#[test]
fn test_bad_regex_surfaces_when_compiling() {
    let args = try_parse_from(["igniter", "-f", "(oops"]).unwrap();
    assert!(args.filter_rules().is_err());
}

#[test]
fn test_all_flags() {
    let args = try_parse_from([
        "igniter",
        "--config",
        "ci/igniter.toml",
        "-j",
        "3",
        "--no-cache",
        "--no-tty",
        "--dry-run",
        "--debug",
        "--nested-keys",
        "--stall-timeout",
        "30",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.config, Some(PathBuf::from("ci/igniter.toml")));
    assert_eq!(args.worker_count(), 3);
    assert!(args.no_cache && args.no_tty && args.dry_run && args.debug && args.nested_keys);
    assert_eq!(args.stall_timeout(), Some(Duration::from_secs(30)));
    assert!(args.log_level.is_some());
}

#[test]
fn test_unknown_flag_is_rejected() {
    assert!(try_parse_from(["igniter", "--watch"]).is_err());
}
