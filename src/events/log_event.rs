//! Structured safety-log events
//!
//! This module contains the event structure produced by the parser and
//! consumed by the cycle windower.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::{LocationId, LocationKind};

/// One state transition of one location, as reported by the safety log
///
/// The timestamp keeps the UTC offset written in the log line; it is never
/// normalized. The transition label has the form `"<FROM> to <TO>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Location whose state machine transitioned
    pub location: LocationId,
    /// When the transition was logged
    pub timestamp: DateTime<FixedOffset>,
    /// Transition label, e.g. `"OPEN to REQUESTED"`
    pub transition: String,
}

impl LogEvent {
    /// Create a new event from a complete transition label
    pub fn new(
        location: LocationId,
        timestamp: DateTime<FixedOffset>,
        transition: impl Into<String>,
    ) -> Self {
        Self { location, timestamp, transition: transition.into() }
    }

    /// Location type of the event
    pub fn kind(&self) -> LocationKind {
        self.location.kind()
    }

    /// Whether this event opens a new access cycle for its location
    pub fn is_cycle_start(&self) -> bool {
        self.transition == self.kind().cycle_start_label()
    }
}

/// Build the `"<FROM> to <TO>"` label for a state transition
pub fn transition_label(from_state: &str, to_state: &str) -> String {
    format!("{} to {}", from_state, to_state)
}
