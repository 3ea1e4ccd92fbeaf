//! Report serialization
//!
//! Writes the in-memory tables of a [`PipelineOutput`] as files. Every
//! writer also has a variant over any `Write` so tables can be checked
//! without touching the filesystem. Output depends only on the tables, so
//! identical runs produce identical bytes.

use chrono::{DateTime, FixedOffset};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::analysis::{DistributionReport, Timeline};
use crate::cycles::{AccessCycle, DeltaColumn, DeltaRecord, TRANSITION_CATALOG};
use crate::pipeline::{PipelineError, PipelineOutput, PipelineResult};
use crate::types::{AnalysisConfig, LocationId, LocationKind, OutputFormat};

/// RFC 3339 text of a timestamp, keeping its offset
pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339()
}

#[derive(Debug, Serialize)]
struct MilestoneRow {
    #[serde(rename = "Location")]
    location: LocationId,
    #[serde(rename = "Cycle Start")]
    cycle_start: DateTime<FixedOffset>,
    #[serde(rename = "Milestones")]
    milestones: BTreeMap<&'static str, Option<DateTime<FixedOffset>>>,
}

impl From<&AccessCycle> for MilestoneRow {
    fn from(cycle: &AccessCycle) -> Self {
        Self {
            location: cycle.location,
            cycle_start: cycle.cycle_start,
            milestones: cycle.milestones().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HistogramRow {
    #[serde(rename = "Location Type")]
    kind: LocationKind,
    #[serde(rename = "Column")]
    column: &'static str,
    #[serde(rename = "Bucket")]
    bucket: usize,
    #[serde(rename = "Lower (s)")]
    lower: u32,
    #[serde(rename = "Upper (s)")]
    upper: Option<u32>,
    #[serde(rename = "Count")]
    count: u64,
}

/// Write the per-cycle milestone table
pub fn write_milestones<W: Write>(writer: W, cycles: &[AccessCycle], format: OutputFormat) -> PipelineResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<MilestoneRow> = cycles.iter().map(MilestoneRow::from).collect();
            write_json(writer, &rows)
        }
        OutputFormat::Csv => {
            let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

            let mut header = vec!["Location", "Cycle Start"];
            header.extend(TRANSITION_CATALOG);
            csv_writer.write_record(&header)?;

            for cycle in cycles {
                let mut record = vec![cycle.location.to_string(), format_timestamp(&cycle.cycle_start)];
                record.extend(
                    cycle.milestones().map(|(_, timestamp)| timestamp.as_ref().map(format_timestamp).unwrap_or_default()),
                );
                csv_writer.write_record(&record)?;
            }
            csv_writer.flush()?;
            Ok(())
        }
    }
}

/// Write the delta table
pub fn write_deltas<W: Write>(writer: W, deltas: &[DeltaRecord], format: OutputFormat) -> PipelineResult<()> {
    match format {
        OutputFormat::Json => write_json(writer, deltas),
        OutputFormat::Csv => {
            let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

            let mut header = vec!["Location", "Request Start"];
            header.extend(DeltaColumn::ALL.iter().map(|column| column.header()));
            csv_writer.write_record(&header)?;

            for record in deltas {
                csv_writer.serialize(record)?;
            }
            csv_writer.flush()?;
            Ok(())
        }
    }
}

/// Write one row per (location type, column, bucket)
pub fn write_histogram<W: Write>(writer: W, report: &DistributionReport) -> PipelineResult<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(["Location Type", "Column", "Bucket", "Lower (s)", "Upper (s)", "Count"])?;

    for distribution in &report.distributions {
        for (bucket, count) in distribution.bucket_counts.iter().enumerate() {
            let (lower, upper) = report.bucket_bounds(bucket);
            csv_writer.serialize(HistogramRow {
                kind: distribution.kind,
                column: distribution.column.header(),
                bucket,
                lower,
                upper,
                count: *count,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the stacked timeline bars
pub fn write_timeline<W: Write>(writer: W, timeline: &Timeline) -> PipelineResult<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record([
        "Location",
        "Request Start",
        "Label",
        "Requested to Gate Closed (s)",
        "Closed to Preparing (s)",
        "Preparing to Safe Access Granted (s)",
        "Total (s)",
    ])?;
    for entry in &timeline.entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> PipelineResult<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes every report of a run into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    base_name: String,
    format: OutputFormat,
    timeline_width: usize,
}

impl ReportWriter {
    /// Create a writer
    pub fn new(output_dir: impl Into<PathBuf>, base_name: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: base_name.into(),
            format,
            timeline_width: crate::types::defaults::TIMELINE_WIDTH,
        }
    }

    /// Create a writer from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> PipelineResult<Self> {
        let format = config.get_output_format().map_err(PipelineError::configuration_error)?;
        Ok(Self::new(&config.output_dir, &config.base_name, format).with_timeline_width(config.timeline_width))
    }

    /// Set the column width of the text timeline
    pub fn with_timeline_width(mut self, width: usize) -> Self {
        self.timeline_width = width;
        self
    }

    /// Path of a report file
    pub fn path_for(&self, suffix: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.{}", self.base_name, suffix, extension))
    }

    /// Write all reports; returns the written paths in write order
    ///
    /// The tables are required. Timeline files that cannot be written are
    /// logged as an output error and left out of the returned paths.
    #[instrument(skip_all, fields(output_dir = %self.output_dir.display()))]
    pub fn write_all(&self, output: &PipelineOutput) -> PipelineResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;
        let extension = self.format.extension();
        let mut written = Vec::new();

        let path = self.path_for("parsed_transitions", extension);
        write_milestones(create(&path)?, &output.cycles, self.format)?;
        written.push(path);

        let path = self.path_for("transition_deltas", extension);
        write_deltas(create(&path)?, &output.deltas, self.format)?;
        written.push(path);

        let path = self.path_for("histogram", "csv");
        write_histogram(create(&path)?, &output.distribution)?;
        written.push(path);

        let path = self.path_for("distribution_summary", "json");
        write_json(create(&path)?, &output.distribution)?;
        written.push(path);

        match self.write_timeline_files(&output.timeline) {
            Ok(paths) => written.extend(paths),
            Err(e) => PipelineError::output_error(format!("access-granted timeline skipped: {}", e)).log(),
        }

        for path in &written {
            debug!(path = %path.display(), "Wrote report");
        }
        info!("Wrote {} report files to {}", written.len(), self.output_dir.display());
        Ok(written)
    }

    fn write_timeline_files(&self, timeline: &Timeline) -> PipelineResult<Vec<PathBuf>> {
        let table = self.path_for("access_granted_timeline", "csv");
        write_timeline(create(&table)?, timeline)?;

        let chart = self.path_for("access_granted_timeline", "txt");
        let mut text = create(&chart)?;
        text.write_all(timeline.render_text(self.timeline_width).as_bytes())?;
        text.flush()?;

        Ok(vec![table, chart])
    }
}

fn create(path: &Path) -> PipelineResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::{CycleWindower, DeltaCalculator, OPEN_TO_REQUESTED, REQUESTED_TO_CLOSED};
    use crate::events::LogEvent;
    use chrono::Duration;

    fn cycles() -> Vec<AccessCycle> {
        let t0 = DateTime::parse_from_rfc3339("2025-07-09T03:00:00.082-04:00").unwrap();
        let dwy = LocationId::driveway(1, 1, 1);
        let events = vec![
            LogEvent::new(dwy, t0, OPEN_TO_REQUESTED),
            LogEvent::new(dwy, t0 - Duration::seconds(5), "OPEN to GATE_CLOSED"),
            LogEvent::new(dwy, t0 + Duration::milliseconds(30_500), REQUESTED_TO_CLOSED),
        ];
        CycleWindower::new().build_cycles(&events).cycles
    }

    fn csv_text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_milestone_csv_has_catalog_columns() {
        let mut buffer = Vec::new();
        write_milestones(&mut buffer, &cycles(), OutputFormat::Csv).unwrap();
        let text = csv_text(buffer);
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("Location,Cycle Start,ACCESS_GRANTED_EMPTY to GATE_CLOSED,"));
        assert_eq!(header.split(',').count(), 2 + TRANSITION_CATALOG.len());

        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Driveway 1, Zone 1, Cell 1\",2025-07-09T03:00:00.082-04:00,"));
        assert!(row.contains("2025-07-09T03:00:30.582-04:00"));
    }

    #[test]
    fn test_delta_csv_keeps_nulls_empty() {
        let deltas = DeltaCalculator::new().compute_all(&cycles());
        let mut buffer = Vec::new();
        write_deltas(&mut buffer, &deltas, OutputFormat::Csv).unwrap();

        let text = csv_text(buffer);
        let expected = concat!(
            "Location,Request Start,Time from Request to Gate Closed (s),",
            "Time from Request to Bots Localized (s),Time from Request to Safe Access Granted (s),",
            "\"Time from Request to Access Granted via \"\"empty button\"\" (s)\"\n",
            "\"Driveway 1, Zone 1, Cell 1\",2025-07-09T03:00:00.082-04:00,30.5,,,\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_delta_json_round_trips() {
        let deltas = DeltaCalculator::new().compute_all(&cycles());
        let mut buffer = Vec::new();
        write_deltas(&mut buffer, &deltas, OutputFormat::Json).unwrap();

        let parsed: Vec<DeltaRecord> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, deltas);
    }

    #[test]
    fn test_histogram_rows() {
        let report = crate::analysis::DistributionAnalyzer::new(60, 1200).analyze(&[]);
        let mut buffer = Vec::new();
        write_histogram(&mut buffer, &report).unwrap();

        let text = csv_text(buffer);
        // header + 3 kinds x 4 columns x 21 buckets
        assert_eq!(text.lines().count(), 1 + 3 * 4 * 21);
        assert!(text.contains("Driveway,Time from Request to Gate Closed (s),20,1200,,0\n"));
    }

    #[test]
    fn test_unwritable_timeline_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), "all_logs", OutputFormat::Csv);
        // A directory in the way makes the timeline table impossible to create.
        fs::create_dir_all(writer.path_for("access_granted_timeline", "csv")).unwrap();

        let config = AnalysisConfig::default();
        let output = crate::pipeline::AnalysisPipeline::new(config).unwrap().run_lines(&[
            "2025-07-09T03:00:00.000-04:00 botguardian1 <info> Aisle 4, Zone 2 transitioned from OPEN to REQUESTED",
            "2025-07-09T03:01:00.000-04:00 botguardian1 <info> Aisle 4, Zone 2 transitioned from PREPARING to SAFE_ACCESS_GRANTED",
        ]);

        let written = writer.write_all(&output).unwrap();
        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|path| !path.to_string_lossy().contains("timeline")));
        assert!(writer.path_for("transition_deltas", "csv").is_file());
    }

    #[test]
    fn test_report_paths() {
        let writer = ReportWriter::new("out", "all_logs", OutputFormat::Json);
        assert_eq!(writer.path_for("transition_deltas", "json"), PathBuf::from("out/all_logs_transition_deltas.json"));
    }
}
