//! Stacked time-to-safe-access timeline
//!
//! Only cycles that reached safe access granted are plotted. Each bar stacks
//! request to gate closed, gate closed to localized and localized to safe
//! access granted. Missing or negative segments are drawn as zero; the raw
//! delta table is never touched.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, instrument};

use crate::cycles::catalog::{
    CLOSED_TO_PREPARING, PREPARING_TO_SAFE_ACCESS_GRANTED, REQUESTED_TO_CLOSED,
};
use crate::cycles::{elapsed_seconds, AccessCycle};
use crate::types::{AnalysisConfig, LocationId};

const SEGMENT_GLYPHS: [char; 3] = ['#', '=', '+'];
const TRUNCATION_MARKER: char = '>';

/// One bar of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Location of the cycle
    #[serde(rename = "Location")]
    pub location: LocationId,
    /// Cycle start
    #[serde(rename = "Request Start")]
    pub cycle_start: DateTime<FixedOffset>,
    /// Axis label, `Location | YYYY-MM-DD HH:MM`
    #[serde(rename = "Label")]
    pub label: String,
    /// Requested to gate closed, clipped at zero
    #[serde(rename = "Requested to Gate Closed (s)")]
    pub request_to_gate_closed: f64,
    /// Gate closed to localization complete, clipped at zero
    #[serde(rename = "Closed to Preparing (s)")]
    pub gate_closed_to_localized: f64,
    /// Localization complete to safe access granted, clipped at zero
    #[serde(rename = "Preparing to Safe Access Granted (s)")]
    pub localized_to_safe_access: f64,
    /// Sum of the three segments
    #[serde(rename = "Total (s)")]
    pub total: f64,
}

impl TimelineEntry {
    /// Build the bar for a cycle, or `None` if safe access was never granted
    ///
    /// Levels have no gate-closed milestone, so both segments touching it
    /// are zero and the whole bar is the last segment.
    pub fn from_cycle(cycle: &AccessCycle) -> Option<Self> {
        let safe_access = cycle.milestone(PREPARING_TO_SAFE_ACCESS_GRANTED)?;
        let gate_closed = cycle
            .kind()
            .has_gate_milestones()
            .then(|| cycle.milestone(REQUESTED_TO_CLOSED))
            .flatten();
        let localized = cycle.milestone(CLOSED_TO_PREPARING);

        let request_to_gate_closed = segment(Some(cycle.cycle_start), gate_closed);
        let gate_closed_to_localized = segment(gate_closed, localized);
        let localized_to_safe_access = segment(localized, Some(safe_access));

        Some(Self {
            location: cycle.location,
            cycle_start: cycle.cycle_start,
            label: format!("{} | {}", cycle.location, cycle.cycle_start.format("%Y-%m-%d %H:%M")),
            request_to_gate_closed,
            gate_closed_to_localized,
            localized_to_safe_access,
            total: request_to_gate_closed + gate_closed_to_localized + localized_to_safe_access,
        })
    }

    /// Segments in stacking order
    pub fn segments(&self) -> [f64; 3] {
        [self.request_to_gate_closed, self.gate_closed_to_localized, self.localized_to_safe_access]
    }
}

/// Display duration between two optional instants; missing or negative is zero
fn segment(from: Option<DateTime<FixedOffset>>, to: Option<DateTime<FixedOffset>>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => elapsed_seconds(from, to).max(0.0),
        _ => 0.0,
    }
}

/// Timeline of all cycles that reached safe access granted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Upper bound of the displayed axis in seconds
    pub cap_seconds: f64,
    /// Bars ordered by ascending cycle start
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Build the timeline from reconstructed cycles
    #[instrument(skip(cycles), fields(cycles = cycles.len()))]
    pub fn build(cycles: &[AccessCycle], cap_seconds: f64) -> Self {
        let mut entries: Vec<TimelineEntry> = cycles.iter().filter_map(TimelineEntry::from_cycle).collect();
        entries.sort_by_key(|entry| entry.cycle_start);

        debug!("Timeline holds {} of {} cycles", entries.len(), cycles.len());
        Self { cap_seconds, entries }
    }

    /// Build the timeline using the configured display cap
    pub fn from_config(cycles: &[AccessCycle], config: &AnalysisConfig) -> Self {
        Self::build(cycles, config.timeline_cap_seconds)
    }

    /// Whether there is nothing to plot
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render a text stacked bar chart `width` columns wide
    ///
    /// Bars longer than the cap are cut at the axis end and marked with `>`.
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(1);
        let cap = if self.cap_seconds > 0.0 { self.cap_seconds } else { 1.0 };
        let label_width = self.entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "Time to Safe Access Granted (stacked per transition), axis 0-{} s", cap);
        let _ = writeln!(
            out,
            "{} requested -> gate closed   {} closed -> preparing   {} preparing -> safe access granted",
            SEGMENT_GLYPHS[0], SEGMENT_GLYPHS[1], SEGMENT_GLYPHS[2]
        );

        if self.entries.is_empty() {
            let _ = writeln!(out, "(no cycles reached safe access granted)");
            return out;
        }

        for entry in &self.entries {
            let bar = render_bar(&entry.segments(), cap, width);
            let _ = writeln!(out, "{:<label_width$} |{}| {:.3} s", entry.label, bar, entry.total);
        }
        out
    }
}

fn render_bar(segments: &[f64; 3], cap: f64, width: usize) -> String {
    let column = |seconds: f64| ((seconds.min(cap) / cap) * width as f64).round() as usize;

    let mut bar = String::with_capacity(width);
    let mut elapsed = 0.0;
    let mut drawn = 0;
    for (glyph, seconds) in SEGMENT_GLYPHS.iter().zip(segments) {
        elapsed += seconds;
        let end = column(elapsed);
        while drawn < end {
            bar.push(*glyph);
            drawn += 1;
        }
    }

    if elapsed > cap {
        bar.pop();
        bar.push(TRUNCATION_MARKER);
    }
    while bar.chars().count() < width {
        bar.push(' ');
    }
    bar
}
