//! Analysis pipeline
//!
//! Runs parse, window, delta, distribution and timeline over one input and
//! returns every table in memory. Nothing here touches the filesystem except
//! [`AnalysisPipeline::run_file`] reading its input; writing reports is the
//! job of [`ReportWriter`](super::ReportWriter).

use std::path::Path;
use tracing::{info, instrument, warn};

use crate::analysis::{DistributionAnalyzer, DistributionReport, Timeline};
use crate::cycles::{AccessCycle, CycleWindower, DeltaCalculator, DeltaRecord};
use crate::events::EventParser;
use crate::ingest::read_log_entries;
use crate::pipeline::{PipelineResult, RunStatistics};
use crate::stage_span;
use crate::types::AnalysisConfig;

/// Every table produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Reconstructed cycles with their milestones
    pub cycles: Vec<AccessCycle>,
    /// Signed deltas, one row per cycle, in cycle order
    pub deltas: Vec<DeltaRecord>,
    /// Histograms and summary statistics
    pub distribution: DistributionReport,
    /// Stacked time-to-safe-access bars
    pub timeline: Timeline,
    /// Run counters
    pub statistics: RunStatistics,
}

/// Access timing pipeline
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    parser: EventParser,
    windower: CycleWindower,
    calculator: DeltaCalculator,
    analyzer: DistributionAnalyzer,
}

impl AnalysisPipeline {
    /// Create a pipeline from a validated configuration
    #[instrument(skip(config), fields(bucket_width = config.bucket_width_seconds, bucket_limit = config.bucket_limit_seconds))]
    pub fn new(config: AnalysisConfig) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self {
            analyzer: DistributionAnalyzer::from_config(&config),
            config,
            parser: EventParser::new(),
            windower: CycleWindower::new(),
            calculator: DeltaCalculator::new(),
        })
    }

    /// Configuration the pipeline runs with
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run over a filtered `Log Entry` table on disk
    ///
    /// A missing or unreadable input is an error; everything inside it is data.
    pub fn run_file(&self, path: &Path) -> PipelineResult<PipelineOutput> {
        info!(path = %path.display(), "Starting analysis run");
        let lines = read_log_entries(path)?;
        Ok(self.run_lines(&lines))
    }

    /// Run over log lines already in memory
    pub fn run_lines<S: AsRef<str>>(&self, lines: &[S]) -> PipelineOutput {
        let mut statistics = RunStatistics { lines_read: lines.len(), ..Default::default() };

        let parsed = {
            let _span = stage_span!("parse", lines = lines.len()).entered();
            self.parser.parse_lines(lines)
        };
        statistics.events_parsed = parsed.events.len();
        statistics.lines_skipped = parsed.skipped_lines;
        if parsed.events.is_empty() {
            warn!("No transition events found in {} lines", lines.len());
        }

        let windows = {
            let _span = stage_span!("window", events = parsed.events.len()).entered();
            self.windower.build_cycles(&parsed.events)
        };
        statistics.locations_seen = windows.location_count;
        statistics.locations_without_cycles = windows.locations_without_cycles.len();
        statistics.events_before_first_cycle = windows.dropped_before_first_cycle;
        statistics.cycles = windows.cycles.len();
        for cycle in &windows.cycles {
            *statistics.cycles_by_kind.entry(cycle.kind()).or_default() += 1;
        }

        let deltas = {
            let _span = stage_span!("deltas", cycles = windows.cycles.len()).entered();
            self.calculator.compute_all(&windows.cycles)
        };
        statistics.rows_with_negative_delta = deltas.iter().filter(|d| d.has_negative_delta()).count();

        let distribution = {
            let _span = stage_span!("distribution", rows = deltas.len()).entered();
            self.analyzer.analyze(&deltas)
        };
        statistics.delta_anomalies = distribution.total_anomalies();

        let timeline = Timeline::from_config(&windows.cycles, &self.config);
        statistics.cycles_with_safe_access = timeline.entries.len();

        info!("Analysis complete: {}", statistics.summary());

        PipelineOutput { cycles: windows.cycles, deltas, distribution, timeline, statistics }
    }
}
