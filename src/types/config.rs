//! Configuration structures for the access timing analysis
//!
//! This module contains the command line interface, the analysis
//! configuration and its validation logic.

use super::OutputFormat;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Histogram and timeline defaults
pub mod defaults {
    /// Width of one histogram bucket in seconds
    pub const BUCKET_WIDTH_SECONDS: u32 = 60;

    /// Upper edge of the last fixed histogram bucket; larger values overflow
    pub const BUCKET_LIMIT_SECONDS: u32 = 1200;

    /// Horizontal display cap of the timeline chart in seconds
    pub const TIMELINE_CAP_SECONDS: f64 = 1200.0;

    /// Number of character columns used by the text timeline bars
    pub const TIMELINE_WIDTH: usize = 60;

    /// Prefix for every report file written by `analyze`
    pub const BASE_NAME: &str = "all_logs";

    /// Keywords a raw log line must contain to survive filtering
    pub const INCLUDE_KEYWORDS: [&str; 2] = ["LockedSetSafetyIOContext", "LockedSetSafeAccessState"];

    /// Phrases that drop a raw log line even when a keyword matched
    pub const EXCLUDE_PHRASES: [&str; 10] = [
        "bot id requested",
        "requested to renew lease",
        "Accountant requested codeplate",
        "Vendor-Class-ID requested",
        "Options requested",
        "SafetyTimeManager",
        "_botLift_",
        "Botlift",
        "Unsafe level",
        "Unsafe cell",
    ];
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "safe-access-timing",
    version = "0.1.0",
    about = "Safe Access Timing - Reconstructs access cycles from safety logs and measures time to safe access",
    long_about = "Turns safety-log transition entries for driveways, aisles and levels into per-location access cycles, milestone tables, time deltas, distribution summaries and a stacked timeline.

EXAMPLES:
    # Filter raw (optionally .gz) safety logs into a Log Entry table
    safe-access-timing filter raw/scpu-20250710.log.gz --output all_logs_filtered.csv

    # Run the cycle and timing analysis
    safe-access-timing analyze all_logs_filtered.csv --output-dir reports

    # Use a configuration file
    safe-access-timing --config analysis.json analyze all_logs_filtered.csv

    # Generate configuration template
    safe-access-timing --print-config > analysis.json

    # Edge timing from bit-vector snapshot lines
    safe-access-timing snapshot intermediate_filtered_log.csv --output event_timing.csv

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    /// Directory for rolling JSON log files
    #[arg(long, global = true, help = "Also write JSON logs to daily files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without processing input
    #[arg(long, global = true, help = "Validate configuration without processing input")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// Pipeline stage to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Pipeline stages exposed on the command line
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter raw safety logs into a single-column "Log Entry" table
    Filter(FilterArgs),
    /// Reconstruct access cycles and write milestone, delta, distribution and timeline reports
    Analyze(AnalyzeArgs),
    /// Measure request-to-release times from bit-vector snapshot lines
    Snapshot(SnapshotArgs),
}

/// Arguments of the `filter` stage
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Raw log files (plain text or .gz), concatenated in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output table path
    #[arg(short, long, default_value = "all_logs_filtered.csv")]
    pub output: PathBuf,
}

/// Arguments of the `analyze` stage
#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Filtered "Log Entry" table (CSV, optionally .gz)
    pub input: PathBuf,

    /// Directory receiving the report files
    #[arg(long, help = "Directory receiving the report files. Default: .")]
    pub output_dir: Option<String>,

    /// Prefix for report file names
    #[arg(long, help = "Prefix for report file names. Default: all_logs")]
    pub base_name: Option<String>,

    /// Table output format
    #[arg(
        long,
        help = "Output format for milestone and delta tables (json or csv)",
        long_help = "Output format for the milestone and delta tables. Supported formats: json, csv. Default: csv"
    )]
    pub output_format: Option<String>,

    /// Histogram bucket width in seconds
    #[arg(long, help = "Histogram bucket width in seconds. Default: 60")]
    pub bucket_width: Option<u32>,

    /// Upper edge of the fixed histogram range in seconds
    #[arg(long, help = "Start of the overflow bucket in seconds. Default: 1200")]
    pub bucket_limit: Option<u32>,

    /// Horizontal display cap of the timeline in seconds
    #[arg(long, help = "Timeline display cap in seconds. Default: 1200")]
    pub timeline_cap: Option<f64>,

    /// Character width of the text timeline bars
    #[arg(long, help = "Character width of the text timeline bars. Default: 60")]
    pub timeline_width: Option<usize>,
}

/// Arguments of the `snapshot` stage
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Snapshot lines (a "Log Entry" table or a raw log, optionally .gz)
    pub input: PathBuf,

    /// Output table path
    #[arg(short, long, default_value = "event_timing.csv")]
    pub output: PathBuf,
}

/// Keyword configuration of the raw log filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    /// Whole-word keywords, at least one must be present (case-insensitive)
    pub include_keywords: Vec<String>,
    /// Phrases that exclude a line when present (case-insensitive)
    pub exclude_phrases: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_keywords: defaults::INCLUDE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            exclude_phrases: defaults::EXCLUDE_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Directory receiving the report files
    pub output_dir: Option<String>,

    /// Prefix for report file names
    pub base_name: Option<String>,

    /// Output format for milestone and delta tables
    pub output_format: Option<String>,

    /// Histogram bucket width in seconds
    pub bucket_width_seconds: Option<u32>,

    /// Start of the overflow bucket in seconds
    pub bucket_limit_seconds: Option<u32>,

    /// Timeline display cap in seconds
    pub timeline_cap_seconds: Option<f64>,

    /// Character width of the text timeline bars
    pub timeline_width: Option<usize>,

    /// Raw log filter keywords
    pub filter: Option<FilterConfig>,
}

/// Configuration for the access timing analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Directory receiving the report files
    pub output_dir: String,

    /// Prefix for report file names
    pub base_name: String,

    /// Output format for milestone and delta tables
    pub output_format: String,

    /// Histogram bucket width in seconds
    pub bucket_width_seconds: u32,

    /// Start of the overflow bucket in seconds
    pub bucket_limit_seconds: u32,

    /// Timeline display cap in seconds
    pub timeline_cap_seconds: f64,

    /// Character width of the text timeline bars
    pub timeline_width: usize,

    /// Raw log filter keywords
    pub filter: FilterConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for the analysis configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Bucket width is zero
    #[error("Bucket width must be greater than 0, got {0}")]
    InvalidBucketWidth(u32),

    /// Bucket limit is not a positive multiple of the bucket width
    #[error("Bucket limit ({limit}) must be a positive multiple of the bucket width ({width})")]
    InvalidBucketLimit {
        /// The configured overflow edge
        limit: u32,
        /// The configured bucket width
        width: u32,
    },

    /// Timeline cap is not a positive finite number
    #[error("Timeline cap must be a positive number of seconds, got {0}")]
    InvalidTimelineCap(f64),

    /// Timeline width is zero
    #[error("Timeline width must be greater than 0, got {0}")]
    InvalidTimelineWidth(usize),

    /// Base name is empty
    #[error("Base name for report files must not be empty")]
    EmptyBaseName,

    /// Output format is not supported
    #[error("Unknown output format: {0} (supported: csv, json)")]
    InvalidOutputFormat(String),

    /// Filter has nothing to match
    #[error("Filter needs at least one include keyword")]
    EmptyIncludeKeywords,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            base_name: defaults::BASE_NAME.to_string(),
            output_format: "csv".to_string(),
            bucket_width_seconds: defaults::BUCKET_WIDTH_SECONDS,
            bucket_limit_seconds: defaults::BUCKET_LIMIT_SECONDS,
            timeline_cap_seconds: defaults::TIMELINE_CAP_SECONDS,
            timeline_width: defaults::TIMELINE_WIDTH,
            filter: FilterConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config = Self::default();

        // Load from config file if specified
        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // Override with command line arguments (CLI takes precedence)
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            output_dir: config_file.output_dir.unwrap_or(defaults.output_dir),
            base_name: config_file.base_name.unwrap_or(defaults.base_name),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            bucket_width_seconds: config_file
                .bucket_width_seconds
                .unwrap_or(defaults.bucket_width_seconds),
            bucket_limit_seconds: config_file
                .bucket_limit_seconds
                .unwrap_or(defaults.bucket_limit_seconds),
            timeline_cap_seconds: config_file
                .timeline_cap_seconds
                .unwrap_or(defaults.timeline_cap_seconds),
            timeline_width: config_file.timeline_width.unwrap_or(defaults.timeline_width),
            filter: config_file.filter.unwrap_or(defaults.filter),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) {
        let Some(Command::Analyze(analyze)) = &args.command else {
            return;
        };

        if let Some(value) = &analyze.output_dir {
            config.output_dir = value.clone();
        }
        if let Some(value) = &analyze.base_name {
            config.base_name = value.clone();
        }
        if let Some(value) = &analyze.output_format {
            config.output_format = value.clone();
        }
        if let Some(value) = analyze.bucket_width {
            config.bucket_width_seconds = value;
        }
        if let Some(value) = analyze.bucket_limit {
            config.bucket_limit_seconds = value;
        }
        if let Some(value) = analyze.timeline_cap {
            config.timeline_cap_seconds = value;
        }
        if let Some(value) = analyze.timeline_width {
            config.timeline_width = value;
        }
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.bucket_width_seconds == 0 {
            return Err(ConfigValidationError::InvalidBucketWidth(self.bucket_width_seconds));
        }

        if self.bucket_limit_seconds == 0
            || self.bucket_limit_seconds % self.bucket_width_seconds != 0
        {
            return Err(ConfigValidationError::InvalidBucketLimit {
                limit: self.bucket_limit_seconds,
                width: self.bucket_width_seconds,
            });
        }

        if !self.timeline_cap_seconds.is_finite() || self.timeline_cap_seconds <= 0.0 {
            return Err(ConfigValidationError::InvalidTimelineCap(self.timeline_cap_seconds));
        }

        if self.timeline_width == 0 {
            return Err(ConfigValidationError::InvalidTimelineWidth(self.timeline_width));
        }

        if self.base_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseName);
        }

        self.get_output_format()
            .map_err(|_| ConfigValidationError::InvalidOutputFormat(self.output_format.clone()))?;

        if self.filter.include_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyIncludeKeywords);
        }

        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }

    /// Number of histogram buckets, including the overflow bucket
    pub fn bucket_count(&self) -> usize {
        (self.bucket_limit_seconds / self.bucket_width_seconds.max(1)) as usize + 1
    }
}
