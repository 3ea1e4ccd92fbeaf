//! Tests for the file-based stages
//!
//! These tests drive the filter, analyze and snapshot stages over real files
//! in a temporary directory, including gzip archives.

use flate2::write::GzEncoder;
use flate2::Compression;
use safe_access_timing::ingest::{
    read_log_entries, write_edge_timings_file, write_log_entries_file, LOG_ENTRY_HEADER,
};
use safe_access_timing::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RAW_DAY_ONE: &str = "\
2025-07-09T03:00:00.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6009 LockedSetSafeAccessState Driveway 1, Zone 1, Cell 1 transitioned from OPEN to REQUESTED
2025-07-09T03:00:01.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6010 SafetyTimeManager LockedSetSafeAccessState tick
2025-07-09T03:00:02.000-04:00 botguardian2.mservices.site7.example.net <info> dhcp Options requested by client
2025-07-09T03:00:30.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6011 LockedSetSafeAccessState Driveway 1, Zone 1, Cell 1 transitioned from REQUESTED to CLOSED
";

const RAW_DAY_TWO: &str = "\
2025-07-09T03:01:30.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6012 LockedSetSafeAccessState Driveway 1, Zone 1, Cell 1 transitioned from CLOSED to PREPARING
2025-07-09T03:02:30.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6013 LockedSetSafeAccessState Driveway 1, Zone 1, Cell 1 transitioned from PREPARING to SAFE_ACCESS_GRANTED
2025-07-09T03:02:31.000-04:00 botguardian2.mservices.site7.example.net <info> mast  39647 #6014 LockedSetSafeAccessState Unsafe level detected
2025-07-09T03:03:00.000-04:00 botguardian2.mservices.site7.example.net <info> kernel: eth0 link up
";

fn write_plain(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_gzip(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

#[test]
fn test_filter_plain_and_gzip_logs() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_plain(dir.path(), "scpu-20250709.log", RAW_DAY_ONE),
        write_gzip(dir.path(), "scpu-20250710.log.gz", RAW_DAY_TWO),
    ];

    let filter = LogFilter::new(&FilterConfig::default()).unwrap();
    let outcome = filter.filter_files(&inputs).unwrap();

    assert_eq!(outcome.lines_scanned, 8);
    assert_eq!(outcome.entries.len(), 4);
    for entry in &outcome.entries {
        assert!(entry.contains(" botguardian2 <info>"), "host name not shortened: {}", entry);
        assert!(entry.contains("transitioned from"));
    }
    // Inputs are concatenated in the given order
    assert!(outcome.entries[0].ends_with("from OPEN to REQUESTED"));
    assert!(outcome.entries[3].ends_with("from PREPARING to SAFE_ACCESS_GRANTED"));
}

#[test]
fn test_filter_then_analyze() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_gzip(dir.path(), "scpu-20250709.log.gz", RAW_DAY_ONE),
        write_plain(dir.path(), "scpu-20250710.log", RAW_DAY_TWO),
    ];

    let outcome = LogFilter::new(&FilterConfig::default()).unwrap().filter_files(&inputs).unwrap();
    let filtered = dir.path().join("all_logs_filtered.csv");
    write_log_entries_file(&filtered, &outcome.entries).unwrap();

    let table = fs::read_to_string(&filtered).unwrap();
    assert!(table.starts_with(LOG_ENTRY_HEADER));
    // Location names contain commas, so entries are quoted
    assert!(table.contains("\"2025-07-09T03:00:00.000-04:00 botguardian2"));
    assert_eq!(read_log_entries(&filtered).unwrap(), outcome.entries);

    let config = AnalysisConfig { output_dir: dir.path().join("reports").display().to_string(), ..Default::default() };
    let output = AnalysisPipeline::new(config.clone()).unwrap().run_file(&filtered).unwrap();

    assert_eq!(output.statistics.lines_read, 4);
    assert_eq!(output.statistics.events_parsed, 4);
    assert_eq!(output.statistics.cycles, 1);
    assert_eq!(output.statistics.cycles_with_safe_access, 1);

    let record = &output.deltas[0];
    assert_eq!(record.delta_to_gate_closed, Some(30.0));
    assert_eq!(record.delta_to_localization_complete, Some(90.0));
    assert_eq!(record.delta_to_safe_access_granted, Some(150.0));

    assert_eq!(output.timeline.entries.len(), 1);
    assert_eq!(output.timeline.entries[0].segments(), [30.0, 60.0, 60.0]);

    let written = ReportWriter::from_config(&config).unwrap().write_all(&output).unwrap();
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }

    let histogram = fs::read_to_string(dir.path().join("reports/all_logs_histogram.csv")).unwrap();
    assert!(histogram.lines().count() > 1);

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("reports/all_logs_distribution_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["bucket_width_seconds"], 60);
}

#[test]
fn test_analyze_reads_gzip_table() {
    let dir = TempDir::new().unwrap();
    let table = format!(
        "{}\n\"2025-07-09T03:00:00.000-04:00 botguardian1 <info> Level 2 transitioned from OPEN to CLOSED\"\n\"2025-07-09T03:04:00.000-04:00 botguardian1 <info> Level 2 transitioned from PREPARING to SAFE_ACCESS_GRANTED\"\n",
        LOG_ENTRY_HEADER
    );
    let path = write_gzip(dir.path(), "all_logs_filtered.csv.gz", &table);

    let output = AnalysisPipeline::new(AnalysisConfig::default()).unwrap().run_file(&path).unwrap();
    assert_eq!(output.deltas.len(), 1);
    assert_eq!(output.deltas[0].location, LocationId::level(2));
    assert_eq!(output.deltas[0].delta_to_safe_access_granted, Some(240.0));
}

#[test]
fn test_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");

    let error = AnalysisPipeline::new(AnalysisConfig::default()).unwrap().run_file(&missing).unwrap_err();
    assert!(matches!(error, PipelineError::InputNotFound(ref path) if path == &missing));
    assert!(error.is_fatal());

    let filter = LogFilter::new(&FilterConfig::default()).unwrap();
    assert!(matches!(filter.filter_files(&[missing]), Err(PipelineError::InputNotFound(_))));
}

#[test]
fn test_snapshot_file_flow() {
    let dir = TempDir::new().unwrap();
    let snapshots = [
        "2025-07-09T03:00:00.000-04:00 botguardian1 <info> _siomon_ Z1 dwy req 0 0",
        "2025-07-09T03:00:00.000-04:00 botguardian1 <info> _siomon_ Z1 dwy door 1 1",
        "2025-07-09T03:00:00.000-04:00 botguardian1 <info> _siomon_ Z1 dwy state O O",
        "2025-07-09T03:00:10.000-04:00 botguardian1 <info> _siomon_ Z1 dwy req 1 0",
        "2025-07-09T03:00:22.500-04:00 botguardian1 <info> _siomon_ Z1 dwy door 0 1",
        "2025-07-09T03:00:40.000-04:00 botguardian1 <info> _siomon_ Z1 dwy state C O",
        "2025-07-09T03:00:41.000-04:00 botguardian1 <info> unrelated line",
    ]
    .map(String::from);

    let input = dir.path().join("intermediate_filtered_log.csv");
    write_log_entries_file(&input, &snapshots).unwrap();

    let lines = read_log_entries(&input).unwrap();
    let scan = SnapshotScan::from_lines(&lines);
    assert_eq!(scan.snapshot_count(), 6);

    let rows = scan.timings();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].position, "Z1-1");
    assert_eq!(rows[0].req_to_door_s, Some(12.5));
    assert_eq!(rows[0].req_to_c_s, Some(30.0));

    let output = dir.path().join("event_timing.csv");
    write_edge_timings_file(&output, &rows).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "Type,Position,Start_Time,Req_to_Door_s,Req_to_C_s,Req_to_Key_s\nDriveway,Z1-1,2025-07-09T03:00:10-04:00,12.5,30.0,\n"
    );
}
