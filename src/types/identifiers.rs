//! Location identifiers for the access timing analysis
//!
//! This module contains the structural identity of every access-controlled
//! location that appears in the safety log: driveways, aisles and levels.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::LocationKind;

/// Identity of an access-controlled location
///
/// Two identifiers are equal iff their kind and every numeric field match.
/// The `Display` form is the canonical log spelling, e.g.
/// `Driveway 1, Zone 2, Cell 3`, `Aisle 4, Zone 1` or `Level 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocationId {
    /// A driveway inside a cell of a zone
    Driveway {
        /// Zone number
        zone: u32,
        /// Cell number within the zone
        cell: u32,
        /// Driveway number within the cell
        driveway: u32,
    },
    /// An aisle of a zone
    Aisle {
        /// Zone number
        zone: u32,
        /// Aisle number within the zone
        aisle: u32,
    },
    /// A whole structure level
    Level {
        /// Level number
        level: u32,
    },
}

impl LocationId {
    /// Create a driveway identifier
    pub fn driveway(zone: u32, cell: u32, driveway: u32) -> Self {
        Self::Driveway { zone, cell, driveway }
    }

    /// Create an aisle identifier
    pub fn aisle(zone: u32, aisle: u32) -> Self {
        Self::Aisle { zone, aisle }
    }

    /// Create a level identifier
    pub fn level(level: u32) -> Self {
        Self::Level { level }
    }

    /// The location type of this identifier
    pub fn kind(&self) -> LocationKind {
        match self {
            LocationId::Driveway { .. } => LocationKind::Driveway,
            LocationId::Aisle { .. } => LocationKind::Aisle,
            LocationId::Level { .. } => LocationKind::Level,
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Driveway { zone, cell, driveway } => {
                write!(f, "Driveway {}, Zone {}, Cell {}", driveway, zone, cell)
            }
            LocationId::Aisle { zone, aisle } => write!(f, "Aisle {}, Zone {}", aisle, zone),
            LocationId::Level { level } => write!(f, "Level {}", level),
        }
    }
}

impl FromStr for LocationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();

        let number = |field: &str, prefix: &str| -> Result<u32, String> {
            field
                .strip_prefix(prefix)
                .map(str::trim)
                .ok_or_else(|| format!("Expected '{}' in location: {}", prefix.trim(), s))?
                .parse::<u32>()
                .map_err(|e| format!("Invalid number in location '{}': {}", s, e))
        };

        match fields.as_slice() {
            [d, z, c] if d.starts_with("Driveway ") => Ok(LocationId::driveway(
                number(z, "Zone ")?,
                number(c, "Cell ")?,
                number(d, "Driveway ")?,
            )),
            [a, z] if a.starts_with("Aisle ") => {
                Ok(LocationId::aisle(number(z, "Zone ")?, number(a, "Aisle ")?))
            }
            [l] if l.starts_with("Level ") => Ok(LocationId::level(number(l, "Level ")?)),
            _ => Err(format!("Unknown location: {}", s)),
        }
    }
}

impl Serialize for LocationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
