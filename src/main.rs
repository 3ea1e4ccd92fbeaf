// Safe Access Timing - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/safe-access-timing filter raw/*.log.gz --output all_logs_filtered.csv
// $ ./target/release/safe-access-timing analyze all_logs_filtered.csv --output-dir reports
// ```

use anyhow::{Context, Result};
use clap::Parser;
use safe_access_timing::ingest::{write_edge_timings_file, read_log_entries, write_log_entries_file};
use safe_access_timing::types::{AnalyzeArgs, FilterArgs, SnapshotArgs};
use safe_access_timing::{
    AnalysisConfig, AnalysisPipeline, CliArgs, Command, LogFilter, LoggingConfig, ReportWriter,
    SnapshotScan,
};
use std::process;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match AnalysisConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging = LoggingConfig::from_flags(args.verbose, args.debug, args.log_dir.as_deref());
    let log_guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    // Load configuration from CLI arguments and optional config file
    let config = match AnalysisConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            exit(1, log_guard);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        exit(1, log_guard);
    }

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no input will be processed.");
        print_configuration_summary(&config);
        return;
    }

    let Some(command) = args.command else {
        eprintln!("No command given. Run with --help to see the available commands.");
        exit(2, log_guard);
    };

    let result = match command {
        Command::Filter(filter_args) => run_filter(&config, &filter_args),
        Command::Analyze(analyze_args) => run_analyze(config, &analyze_args),
        Command::Snapshot(snapshot_args) => run_snapshot(&snapshot_args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        exit(1, log_guard);
    }
}

/// Flush buffered file logs, then exit with `code`
fn exit(code: i32, log_guard: Option<WorkerGuard>) -> ! {
    drop(log_guard);
    process::exit(code)
}

/// Filter raw logs into a `Log Entry` table
fn run_filter(config: &AnalysisConfig, args: &FilterArgs) -> Result<()> {
    let filter = LogFilter::new(&config.filter).context("Failed to build log filter")?;
    let outcome = filter.filter_files(&args.inputs).context("Failed to filter raw logs")?;

    write_log_entries_file(&args.output, &outcome.entries)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    eprintln!(
        "Filtered log written to {} ({} of {} lines kept)",
        args.output.display(),
        outcome.entries.len(),
        outcome.lines_scanned
    );
    Ok(())
}

/// Run the analysis pipeline and write all reports
fn run_analyze(config: AnalysisConfig, args: &AnalyzeArgs) -> Result<()> {
    print_configuration_summary(&config);

    let writer = ReportWriter::from_config(&config)?;
    let pipeline = AnalysisPipeline::new(config)?;

    let output = pipeline
        .run_file(&args.input)
        .with_context(|| format!("Failed to analyze {}", args.input.display()))?;

    let written = writer.write_all(&output).context("Failed to write reports")?;

    eprintln!("{}", output.statistics.generate_summary_report());
    eprintln!("Reports:");
    for path in written {
        eprintln!("  {}", path.display());
    }
    Ok(())
}

/// Measure edge timings from snapshot lines
fn run_snapshot(args: &SnapshotArgs) -> Result<()> {
    let lines = read_log_entries(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let scan = SnapshotScan::from_lines(&lines);
    let rows = scan.timings();

    write_edge_timings_file(&args.output, &rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    eprintln!(
        "Edge timings written to {} ({} positions from {} snapshots)",
        args.output.display(),
        rows.len(),
        scan.snapshot_count()
    );
    Ok(())
}

/// Print configuration summary
fn print_configuration_summary(config: &AnalysisConfig) {
    eprintln!("Configuration:");
    eprintln!("  Output Directory: {}", config.output_dir);
    eprintln!("  Base Name: {}", config.base_name);
    eprintln!("  Output Format: {}", config.output_format);
    eprintln!(
        "  Histogram: {} s buckets up to {} s ({} buckets incl. overflow)",
        config.bucket_width_seconds,
        config.bucket_limit_seconds,
        config.bucket_count()
    );
    eprintln!(
        "  Timeline: capped at {} s, {} columns",
        config.timeline_cap_seconds, config.timeline_width
    );
    eprintln!();
}
