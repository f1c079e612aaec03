// tests/logging.rs

use igniter::cli::LogLevel;
use igniter::logging::{build_filter, filter_directives, parse_level_str};

#[test]
fn test_level_names_are_case_insensitive() {
    assert_eq!(parse_level_str("DEBUG"), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str(" warning "), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("trace"), Some(tracing::Level::TRACE));
}

#[test]
fn test_unknown_level_is_none() {
    assert_eq!(parse_level_str("loud"), None);
}

#[test]
fn test_cli_level_is_scoped_to_igniter_and_wins_over_env() {
    assert_eq!(
        filter_directives(Some(LogLevel::Debug), Some("trace")),
        "warn,igniter=debug"
    );
}

#[test]
fn test_env_level_name_is_scoped_to_igniter() {
    assert_eq!(filter_directives(None, Some(" Warning ")), "warn,igniter=warn");
    assert_eq!(filter_directives(None, Some("info")), "warn,igniter=info");
}

#[test]
fn test_env_directives_pass_through() {
    assert_eq!(
        filter_directives(None, Some("warn,igniter::task=trace")),
        "warn,igniter::task=trace"
    );
}

#[test]
fn test_default_is_warn() {
    assert_eq!(filter_directives(None, None), "warn");
    assert_eq!(filter_directives(None, Some("  ")), "warn");
}

#[test]
fn test_build_filter_accepts_resolved_directives() {
    assert!(build_filter(Some(LogLevel::Trace), None).is_ok());
    assert!(build_filter(None, Some("igniter::exec=debug,tokio=off")).is_ok());
}
