//! Delta distributions per location type
//!
//! Each (location type, delta column) pair gets a fixed-width histogram with
//! an overflow bucket and a small set of summary statistics. Null deltas and
//! anomalous deltas (negative or non-finite) are counted but never binned, so
//! `sum(buckets) + anomalies + nulls` always equals the row count.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cycles::{DeltaColumn, DeltaRecord};
use crate::types::{AnalysisConfig, LocationKind};

/// Fixed-width histogram over `[0, limit)` plus an overflow bucket `[limit, +inf)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    width: u32,
    limit: u32,
    counts: Vec<u64>,
}

impl Histogram {
    /// Create an empty histogram
    ///
    /// `limit` is expected to be a positive multiple of `width`.
    pub fn new(width: u32, limit: u32) -> Self {
        let width = width.max(1);
        Self { width, limit, counts: vec![0; (limit / width) as usize + 1] }
    }

    /// Count a non-negative finite value
    pub fn record(&mut self, value: f64) {
        let overflow = self.counts.len() - 1;
        let index = if value >= self.limit as f64 {
            overflow
        } else {
            ((value / self.width as f64).floor() as usize).min(overflow)
        };
        self.counts[index] += 1;
    }

    /// Bucket counts, overflow last
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Total number of binned values
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Lower and upper bound of a bucket; the overflow bucket has no upper bound
    pub fn bounds(&self, index: usize) -> (u32, Option<u32>) {
        bucket_bounds(self.width, self.limit, index)
    }

    fn into_counts(self) -> Vec<u64> {
        self.counts
    }
}

/// Bounds of bucket `index` for a given width and limit
pub fn bucket_bounds(width: u32, limit: u32, index: usize) -> (u32, Option<u32>) {
    let lower = (index as u32).saturating_mul(width).min(limit);
    if lower >= limit {
        (limit, None)
    } else {
        (lower, Some(lower + width))
    }
}

/// Linear-interpolated percentile of an ascending sample
///
/// `pct` is in `[0, 1]`. Returns `None` for an empty sample.
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let rank = pct.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Summary statistics over the binned sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Sample size
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

impl SummaryStats {
    /// Compute statistics; `None` for an empty sample
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len().max(1) as f64,
            median: percentile(&sorted, 0.50)?,
            p95: percentile(&sorted, 0.95)?,
            p99: percentile(&sorted, 0.99)?,
        })
    }
}

/// Distribution of one delta column within one location type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDistribution {
    /// Location type of the sample
    pub kind: LocationKind,
    /// Delta column of the sample
    pub column: DeltaColumn,
    /// Rows of this location type
    pub total_rows: usize,
    /// Rows whose delta is null
    pub null_count: usize,
    /// Rows whose delta is negative or non-finite
    pub anomaly_count: usize,
    /// Bucket counts, overflow last
    pub bucket_counts: Vec<u64>,
    /// Statistics over the binned values
    pub stats: Option<SummaryStats>,
}

impl ColumnDistribution {
    /// Number of binned values
    pub fn binned(&self) -> u64 {
        self.bucket_counts.iter().sum()
    }
}

/// Distributions of every (location type, column) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Bucket width in seconds
    pub bucket_width_seconds: u32,
    /// Start of the overflow bucket in seconds
    pub bucket_limit_seconds: u32,
    /// Distributions, location type major, in [`LocationKind::ALL`] then
    /// [`DeltaColumn::ALL`] order
    pub distributions: Vec<ColumnDistribution>,
}

impl DistributionReport {
    /// Distribution for one pair
    pub fn get(&self, kind: LocationKind, column: DeltaColumn) -> Option<&ColumnDistribution> {
        self.distributions.iter().find(|d| d.kind == kind && d.column == column)
    }

    /// Bounds of bucket `index`
    pub fn bucket_bounds(&self, index: usize) -> (u32, Option<u32>) {
        bucket_bounds(self.bucket_width_seconds, self.bucket_limit_seconds, index)
    }

    /// Total anomalies across all pairs
    pub fn total_anomalies(&self) -> usize {
        self.distributions.iter().map(|d| d.anomaly_count).sum()
    }
}

/// Partitions delta records and builds their distributions
#[derive(Debug, Clone, Copy)]
pub struct DistributionAnalyzer {
    bucket_width_seconds: u32,
    bucket_limit_seconds: u32,
}

impl Default for DistributionAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl DistributionAnalyzer {
    /// Create an analyzer with explicit bucket geometry
    pub fn new(bucket_width_seconds: u32, bucket_limit_seconds: u32) -> Self {
        Self { bucket_width_seconds: bucket_width_seconds.max(1), bucket_limit_seconds }
    }

    /// Create an analyzer from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.bucket_width_seconds, config.bucket_limit_seconds)
    }

    /// Analyze every (location type, column) pair
    ///
    /// Pairs are always present, even when a location type has no rows.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn analyze(&self, records: &[DeltaRecord]) -> DistributionReport {
        let mut distributions = Vec::with_capacity(LocationKind::ALL.len() * DeltaColumn::ALL.len());

        for kind in LocationKind::ALL {
            let rows: Vec<&DeltaRecord> = records.iter().filter(|r| r.kind() == kind).collect();
            for column in DeltaColumn::ALL {
                distributions.push(self.analyze_column(kind, column, &rows));
            }
        }

        let report = DistributionReport {
            bucket_width_seconds: self.bucket_width_seconds,
            bucket_limit_seconds: self.bucket_limit_seconds,
            distributions,
        };

        let anomalies = report.total_anomalies();
        if anomalies > 0 {
            warn!("{} anomalous deltas excluded from histograms and statistics", anomalies);
        }
        report
    }

    fn analyze_column(
        &self,
        kind: LocationKind,
        column: DeltaColumn,
        rows: &[&DeltaRecord],
    ) -> ColumnDistribution {
        let mut histogram = Histogram::new(self.bucket_width_seconds, self.bucket_limit_seconds);
        let mut sample = Vec::with_capacity(rows.len());
        let mut null_count = 0;
        let mut anomaly_count = 0;

        for row in rows {
            match row.get(column) {
                None => null_count += 1,
                Some(value) if !value.is_finite() || value < 0.0 => {
                    debug!(location = %row.location, %column, value, "Anomalous delta");
                    anomaly_count += 1;
                }
                Some(value) => {
                    histogram.record(value);
                    sample.push(value);
                }
            }
        }

        ColumnDistribution {
            kind,
            column,
            total_rows: rows.len(),
            null_count,
            anomaly_count,
            bucket_counts: histogram.into_counts(),
            stats: SummaryStats::from_sample(&sample),
        }
    }
}
