//! Elapsed time from cycle start to each milestone
//!
//! Deltas keep their sign. A negative delta means the log carried
//! out-of-order timestamps; it is reported as-is and only the distribution
//! analysis treats it as an anomaly.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

use super::catalog::{
    CLOSED_EMPTY_TO_ACCESS_GRANTED_EMPTY, CLOSED_TO_PREPARING, PREPARING_TO_SAFE_ACCESS_GRANTED,
    REQUESTED_TO_CLOSED,
};
use super::windower::AccessCycle;
use crate::types::{LocationId, LocationKind};

/// Delta columns of the metrics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeltaColumn {
    /// Request to gate closed
    GateClosed,
    /// Request to bots localized
    LocalizationComplete,
    /// Request to safe access granted
    SafeAccessGranted,
    /// Request to access granted through the empty button
    AccessGrantedViaEmpty,
}

impl DeltaColumn {
    /// All delta columns in table order
    pub const ALL: [DeltaColumn; 4] = [
        DeltaColumn::GateClosed,
        DeltaColumn::LocalizationComplete,
        DeltaColumn::SafeAccessGranted,
        DeltaColumn::AccessGrantedViaEmpty,
    ];

    /// Transition label the column measures
    pub fn milestone_label(&self) -> &'static str {
        match self {
            DeltaColumn::GateClosed => REQUESTED_TO_CLOSED,
            DeltaColumn::LocalizationComplete => CLOSED_TO_PREPARING,
            DeltaColumn::SafeAccessGranted => PREPARING_TO_SAFE_ACCESS_GRANTED,
            DeltaColumn::AccessGrantedViaEmpty => CLOSED_EMPTY_TO_ACCESS_GRANTED_EMPTY,
        }
    }

    /// Table header of the column
    pub fn header(&self) -> &'static str {
        match self {
            DeltaColumn::GateClosed => "Time from Request to Gate Closed (s)",
            DeltaColumn::LocalizationComplete => "Time from Request to Bots Localized (s)",
            DeltaColumn::SafeAccessGranted => "Time from Request to Safe Access Granted (s)",
            DeltaColumn::AccessGrantedViaEmpty => {
                "Time from Request to Access Granted via \"empty button\" (s)"
            }
        }
    }

    /// Whether the column is computed for a location type
    pub fn applies_to(&self, kind: LocationKind) -> bool {
        match self {
            DeltaColumn::GateClosed | DeltaColumn::AccessGrantedViaEmpty => kind.has_gate_milestones(),
            DeltaColumn::LocalizationComplete | DeltaColumn::SafeAccessGranted => true,
        }
    }
}

impl fmt::Display for DeltaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaColumn::GateClosed => write!(f, "gate_closed"),
            DeltaColumn::LocalizationComplete => write!(f, "localization_complete"),
            DeltaColumn::SafeAccessGranted => write!(f, "safe_access_granted"),
            DeltaColumn::AccessGrantedViaEmpty => write!(f, "access_granted_via_empty"),
        }
    }
}

/// Signed elapsed seconds per milestone of one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Location of the cycle
    #[serde(rename = "Location")]
    pub location: LocationId,
    /// Cycle start
    #[serde(rename = "Request Start")]
    pub request_start: DateTime<FixedOffset>,
    /// Seconds to gate closed
    #[serde(rename = "Time from Request to Gate Closed (s)")]
    pub delta_to_gate_closed: Option<f64>,
    /// Seconds to bots localized
    #[serde(rename = "Time from Request to Bots Localized (s)")]
    pub delta_to_localization_complete: Option<f64>,
    /// Seconds to safe access granted
    #[serde(rename = "Time from Request to Safe Access Granted (s)")]
    pub delta_to_safe_access_granted: Option<f64>,
    /// Seconds to access granted through the empty button
    #[serde(rename = "Time from Request to Access Granted via \"empty button\" (s)")]
    pub delta_to_access_granted_via_empty: Option<f64>,
}

impl DeltaRecord {
    /// Value of one delta column
    pub fn get(&self, column: DeltaColumn) -> Option<f64> {
        match column {
            DeltaColumn::GateClosed => self.delta_to_gate_closed,
            DeltaColumn::LocalizationComplete => self.delta_to_localization_complete,
            DeltaColumn::SafeAccessGranted => self.delta_to_safe_access_granted,
            DeltaColumn::AccessGrantedViaEmpty => self.delta_to_access_granted_via_empty,
        }
    }

    /// Location type of the record
    pub fn kind(&self) -> LocationKind {
        self.location.kind()
    }

    /// Whether any delta is negative
    pub fn has_negative_delta(&self) -> bool {
        DeltaColumn::ALL.iter().any(|column| self.get(*column).is_some_and(|v| v < 0.0))
    }
}

/// Computes deltas from access cycles
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaCalculator;

impl DeltaCalculator {
    /// Create a new calculator
    pub fn new() -> Self {
        Self
    }

    /// Deltas of one cycle; columns not meaningful for the location type are null
    pub fn compute(&self, cycle: &AccessCycle) -> DeltaRecord {
        let kind = cycle.kind();
        let delta = |column: DeltaColumn| {
            if !column.applies_to(kind) {
                return None;
            }
            cycle
                .milestone(column.milestone_label())
                .map(|milestone| elapsed_seconds(cycle.cycle_start, milestone))
        };

        DeltaRecord {
            location: cycle.location,
            request_start: cycle.cycle_start,
            delta_to_gate_closed: delta(DeltaColumn::GateClosed),
            delta_to_localization_complete: delta(DeltaColumn::LocalizationComplete),
            delta_to_safe_access_granted: delta(DeltaColumn::SafeAccessGranted),
            delta_to_access_granted_via_empty: delta(DeltaColumn::AccessGrantedViaEmpty),
        }
    }

    /// Deltas of many cycles, in cycle order
    #[instrument(skip_all, fields(cycles = cycles.len()))]
    pub fn compute_all(&self, cycles: &[AccessCycle]) -> Vec<DeltaRecord> {
        cycles.iter().map(|cycle| self.compute(cycle)).collect()
    }
}

/// Signed seconds from `start` to `end`, at the precision of the timestamps
///
/// Spans too long for nanosecond arithmetic fall back to microseconds.
pub fn elapsed_seconds(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> f64 {
    let elapsed = end.signed_duration_since(start);
    if let Some(nanos) = elapsed.num_nanoseconds() {
        return nanos as f64 / 1_000_000_000.0;
    }
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => elapsed.num_milliseconds() as f64 / 1_000.0,
    }
}
