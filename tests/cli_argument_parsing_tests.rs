//! Tests for CLI argument parsing functionality
//!
//! These tests verify that subcommands and their options are parsed, and
//! that CLI values take precedence over configuration files.

use clap::Parser;
use safe_access_timing::types::config::{AnalysisConfig, CliArgs, Command, ConfigError, ConfigValidationError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test parsing of the filter subcommand
#[test]
fn test_filter_subcommand_parsing() {
    let args = CliArgs::try_parse_from(["test", "filter", "a.log", "b.log.gz"]).unwrap();
    match args.command {
        Some(Command::Filter(filter)) => {
            assert_eq!(filter.inputs, vec![PathBuf::from("a.log"), PathBuf::from("b.log.gz")]);
            assert_eq!(filter.output, PathBuf::from("all_logs_filtered.csv"));
        }
        other => panic!("Expected filter command, got {:?}", other),
    }

    let args = CliArgs::try_parse_from(["test", "filter", "a.log", "-o", "filtered.csv"]).unwrap();
    let Some(Command::Filter(filter)) = args.command else {
        panic!("Expected filter command");
    };
    assert_eq!(filter.output, PathBuf::from("filtered.csv"));

    // At least one input is required
    assert!(CliArgs::try_parse_from(["test", "filter"]).is_err());
}

/// Test parsing of the analyze subcommand and its overrides
#[test]
fn test_analyze_subcommand_parsing() {
    let args = CliArgs::try_parse_from([
        "test",
        "analyze",
        "all_logs_filtered.csv",
        "--output-dir",
        "reports",
        "--base-name",
        "night",
        "--output-format",
        "json",
        "--bucket-width",
        "30",
        "--bucket-limit",
        "600",
        "--timeline-cap",
        "900",
        "--timeline-width",
        "80",
    ])
    .unwrap();

    let Some(Command::Analyze(analyze)) = &args.command else {
        panic!("Expected analyze command");
    };
    assert_eq!(analyze.input, PathBuf::from("all_logs_filtered.csv"));

    let config = AnalysisConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.output_dir, "reports");
    assert_eq!(config.base_name, "night");
    assert_eq!(config.output_format, "json");
    assert_eq!(config.bucket_width_seconds, 30);
    assert_eq!(config.bucket_limit_seconds, 600);
    assert_eq!(config.timeline_cap_seconds, 900.0);
    assert_eq!(config.timeline_width, 80);
    assert_eq!(config.bucket_count(), 21);
    config.validate().unwrap();
}

/// Test parsing of the snapshot subcommand
#[test]
fn test_snapshot_subcommand_parsing() {
    let args = CliArgs::try_parse_from(["test", "snapshot", "intermediate_filtered_log.csv"]).unwrap();
    let Some(Command::Snapshot(snapshot)) = args.command else {
        panic!("Expected snapshot command");
    };
    assert_eq!(snapshot.input, PathBuf::from("intermediate_filtered_log.csv"));
    assert_eq!(snapshot.output, PathBuf::from("event_timing.csv"));
}

/// Test global flags before and after the subcommand
#[test]
fn test_global_flags() {
    let args = CliArgs::try_parse_from(["test", "--verbose", "analyze", "in.csv", "--dry-run"]).unwrap();
    assert!(args.verbose);
    assert!(args.dry_run);
    assert!(!args.debug);

    let args = CliArgs::try_parse_from(["test", "analyze", "in.csv", "--debug", "--log-dir", "logs"]).unwrap();
    assert!(args.debug);
    assert_eq!(args.log_dir.as_deref(), Some("logs"));

    let args = CliArgs::try_parse_from(["test", "--print-config"]).unwrap();
    assert!(args.print_config);
    assert!(args.command.is_none());
}

/// Test that unknown subcommands and bad values are rejected
#[test]
fn test_invalid_arguments_rejected() {
    assert!(CliArgs::try_parse_from(["test", "simulate"]).is_err());
    assert!(CliArgs::try_parse_from(["test", "analyze", "in.csv", "--bucket-width", "abc"]).is_err());
    assert!(CliArgs::try_parse_from(["test", "analyze", "in.csv", "--bucket-width", "-5"]).is_err());
    assert!(CliArgs::try_parse_from(["test", "analyze"]).is_err());
}

/// Test that a configuration file is merged with defaults and overridden by the CLI
#[test]
fn test_config_file_with_cli_precedence() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("analysis.json");
    fs::write(
        &config_path,
        r#"{
            "base_name": "from_file",
            "bucket_width_seconds": 120,
            "bucket_limit_seconds": 2400,
            "output_format": "json"
        }"#,
    )
    .unwrap();
    let config_arg = config_path.display().to_string();

    let args = CliArgs::try_parse_from(["test", "--config", &config_arg, "analyze", "in.csv"]).unwrap();
    let config = AnalysisConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.base_name, "from_file");
    assert_eq!(config.bucket_width_seconds, 120);
    assert_eq!(config.bucket_limit_seconds, 2400);
    assert_eq!(config.output_format, "json");
    // Unset fields fall back to defaults
    assert_eq!(config.timeline_width, AnalysisConfig::default().timeline_width);
    assert_eq!(config.filter, AnalysisConfig::default().filter);

    let args = CliArgs::try_parse_from([
        "test",
        "--config",
        &config_arg,
        "analyze",
        "in.csv",
        "--base-name",
        "from_cli",
    ])
    .unwrap();
    let config = AnalysisConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.base_name, "from_cli");
    assert_eq!(config.bucket_width_seconds, 120);
}

/// Test that analyze overrides do not leak into other subcommands
#[test]
fn test_filter_command_uses_file_configuration() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("filter.json");
    fs::write(
        &config_path,
        r#"{ "filter": { "include_keywords": ["Driveway"], "exclude_phrases": [] } }"#,
    )
    .unwrap();
    let config_arg = config_path.display().to_string();

    let args = CliArgs::try_parse_from(["test", "-c", &config_arg, "filter", "raw.log"]).unwrap();
    let config = AnalysisConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.filter.include_keywords, vec!["Driveway".to_string()]);
    assert!(config.filter.exclude_phrases.is_empty());
    assert_eq!(config.base_name, AnalysisConfig::default().base_name);
}

/// Test configuration file errors
#[test]
fn test_config_file_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(AnalysisConfig::from_file(&missing), Err(ConfigError::FileNotFound(_))));

    let yaml = dir.path().join("analysis.yaml");
    fs::write(&yaml, "base_name: x").unwrap();
    assert!(matches!(AnalysisConfig::from_file(&yaml), Err(ConfigError::UnsupportedFormat(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(AnalysisConfig::from_file(&broken), Err(ConfigError::JsonError(_))));
}

/// Test that the printed default configuration loads back unchanged
#[test]
fn test_print_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defaults.json");

    let json = AnalysisConfig::default().print_json().unwrap();
    assert!(json.contains("\"bucket_width_seconds\": 60"));
    fs::write(&path, json).unwrap();

    assert_eq!(AnalysisConfig::from_file(&path).unwrap(), AnalysisConfig::default());
}

/// Test validation of CLI-provided values
#[test]
fn test_cli_values_are_validated() {
    let parse = |extra: &[&str]| {
        let mut argv = vec!["test", "analyze", "in.csv"];
        argv.extend_from_slice(extra);
        AnalysisConfig::from_cli_args(&CliArgs::try_parse_from(argv).unwrap()).unwrap()
    };

    assert!(matches!(
        parse(&["--bucket-width", "0"]).validate(),
        Err(ConfigValidationError::InvalidBucketWidth(0))
    ));
    assert!(matches!(
        parse(&["--bucket-width", "70"]).validate(),
        Err(ConfigValidationError::InvalidBucketLimit { limit: 1200, width: 70 })
    ));
    assert!(matches!(
        parse(&["--timeline-cap", "0"]).validate(),
        Err(ConfigValidationError::InvalidTimelineCap(_))
    ));
    assert!(matches!(
        parse(&["--timeline-width", "0"]).validate(),
        Err(ConfigValidationError::InvalidTimelineWidth(0))
    ));
    assert!(matches!(
        parse(&["--base-name", " "]).validate(),
        Err(ConfigValidationError::EmptyBaseName)
    ));
    assert!(matches!(
        parse(&["--output-format", "xml"]).validate(),
        Err(ConfigValidationError::InvalidOutputFormat(_))
    ));
}
