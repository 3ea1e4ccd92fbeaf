//! Enumeration types for the access timing analysis
//!
//! This module contains the location taxonomy and the output formats used by
//! the report writer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access requested at a driveway or aisle; opens a driveway/aisle cycle
pub const OPEN_TO_REQUESTED: &str = "OPEN to REQUESTED";

/// Level closed; opens a level cycle
pub const OPEN_TO_CLOSED: &str = "OPEN to CLOSED";

/// Types of access-controlled locations
///
/// The taxonomy is closed: every parsed location is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationKind {
    /// Driveway inside a cell
    Driveway,
    /// Storage aisle
    Aisle,
    /// Whole structure level
    Level,
}

impl LocationKind {
    /// All location kinds in reporting order
    pub const ALL: [LocationKind; 3] =
        [LocationKind::Driveway, LocationKind::Aisle, LocationKind::Level];

    /// Transition label that opens a new access cycle for this location type
    ///
    /// Levels start a cycle when they close; driveways and aisles start a cycle
    /// when access is requested.
    pub fn cycle_start_label(&self) -> &'static str {
        match self {
            LocationKind::Level => OPEN_TO_CLOSED,
            LocationKind::Driveway | LocationKind::Aisle => OPEN_TO_REQUESTED,
        }
    }

    /// Whether gate-closed and empty-button deltas are meaningful for this type
    pub fn has_gate_milestones(&self) -> bool {
        !matches!(self, LocationKind::Level)
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Driveway => write!(f, "Driveway"),
            LocationKind::Aisle => write!(f, "Aisle"),
            LocationKind::Level => write!(f, "Level"),
        }
    }
}

impl FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driveway" | "dwy" => Ok(LocationKind::Driveway),
            "aisle" => Ok(LocationKind::Aisle),
            "level" => Ok(LocationKind::Level),
            _ => Err(format!("Unknown location type: {}", s)),
        }
    }
}

/// Output format for the milestone and delta tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// JSON format for structured data
    Json,
    /// CSV format for tabular data
    Csv,
}

impl OutputFormat {
    /// File extension for tables written in this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
