//! Run statistics
//!
//! Counters collected while the pipeline runs. They describe the input's data
//! quality and are reported to the operator; they never enter the output
//! tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::LocationKind;

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Lines handed to the parser
    pub lines_read: usize,
    /// Lines that produced a transition event
    pub events_parsed: usize,
    /// Lines that did not describe a transition
    pub lines_skipped: usize,
    /// Distinct locations seen
    pub locations_seen: usize,
    /// Locations that never logged their cycle-start transition
    pub locations_without_cycles: usize,
    /// Events logged before their location's first cycle start
    pub events_before_first_cycle: usize,
    /// Cycles reconstructed
    pub cycles: usize,
    /// Cycles per location type
    pub cycles_by_kind: BTreeMap<LocationKind, usize>,
    /// Cycles that reached safe access granted
    pub cycles_with_safe_access: usize,
    /// Deltas excluded from the distributions as anomalous
    pub delta_anomalies: usize,
    /// Delta rows with at least one negative delta
    pub rows_with_negative_delta: usize,
}

impl RunStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of lines that parsed as transitions, in percent
    pub fn parse_rate(&self) -> f64 {
        if self.lines_read == 0 {
            0.0
        } else {
            (self.events_parsed as f64 / self.lines_read as f64) * 100.0
        }
    }

    /// Share of cycles that reached safe access granted, in percent
    pub fn safe_access_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            (self.cycles_with_safe_access as f64 / self.cycles as f64) * 100.0
        }
    }

    /// Cycles of one location type
    pub fn cycles_of(&self, kind: LocationKind) -> usize {
        self.cycles_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} lines, {} events, {} cycles ({} reached safe access), {} anomalous deltas",
            self.lines_read,
            self.events_parsed,
            self.cycles,
            self.cycles_with_safe_access,
            self.delta_anomalies
        )
    }

    /// Multi-line report for the end of a run
    pub fn generate_summary_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Access Timing Summary Report ===\n\n");

        report.push_str("Input:\n");
        report.push_str(&format!("  • Lines Read: {}\n", self.lines_read));
        report.push_str(&format!(
            "  • Transition Events: {} ({:.1}%)\n",
            self.events_parsed,
            self.parse_rate()
        ));
        report.push_str(&format!("  • Skipped Lines: {}\n\n", self.lines_skipped));

        report.push_str("Cycles:\n");
        report.push_str(&format!("  • Locations Seen: {}\n", self.locations_seen));
        report.push_str(&format!(
            "  • Locations Without Cycle Start: {}\n",
            self.locations_without_cycles
        ));
        report.push_str(&format!(
            "  • Events Before First Cycle: {}\n",
            self.events_before_first_cycle
        ));
        report.push_str(&format!("  • Total Cycles: {}\n", self.cycles));
        for kind in LocationKind::ALL {
            report.push_str(&format!("    - {}: {}\n", kind, self.cycles_of(kind)));
        }
        report.push_str(&format!(
            "  • Reached Safe Access: {} ({:.1}%)\n\n",
            self.cycles_with_safe_access,
            self.safe_access_rate()
        ));

        report.push_str("Data Quality:\n");
        report.push_str(&format!("  • Anomalous Deltas: {}\n", self.delta_anomalies));
        report.push_str(&format!(
            "  • Rows With Negative Delta: {}\n",
            self.rows_with_negative_delta
        ));

        report
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_report())
    }
}
