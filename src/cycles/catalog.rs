//! Transition labels tracked as cycle milestones
//!
//! The catalog is a location-type-agnostic superset: driveway transitions
//! first, then the additional aisle and level transitions.

pub use crate::types::{OPEN_TO_CLOSED, OPEN_TO_REQUESTED};

/// Gate closed after a request
pub const REQUESTED_TO_CLOSED: &str = "REQUESTED to CLOSED";
/// Bots localized, preparing safe access
pub const CLOSED_TO_PREPARING: &str = "CLOSED to PREPARING";
/// Safe access granted
pub const PREPARING_TO_SAFE_ACCESS_GRANTED: &str = "PREPARING to SAFE_ACCESS_GRANTED";
/// Access granted through the empty-button fast path
pub const CLOSED_EMPTY_TO_ACCESS_GRANTED_EMPTY: &str = "CLOSED_EMPTY to ACCESS_GRANTED_EMPTY";

/// Every transition whose first in-cycle occurrence is recorded
pub const TRANSITION_CATALOG: [&str; 32] = [
    "ACCESS_GRANTED_EMPTY to GATE_CLOSED",
    "ACCESS_GRANTED_EMPTY to OPEN",
    "ACCESS_GRANTED_EMPTY to REQUESTED",
    "BYPASSED to OPEN",
    "BYPASSED to REQUESTED",
    "CLOSED to ACCESS_GRANTED_EMPTY",
    "CLOSED to CLOSED_EMPTY",
    "CLOSED to OPEN",
    CLOSED_TO_PREPARING,
    CLOSED_EMPTY_TO_ACCESS_GRANTED_EMPTY,
    "CLOSED_EMPTY to OPEN",
    "GATE_CLOSED to OPEN",
    "OPEN to BYPASSED",
    "OPEN to GATE_CLOSED",
    OPEN_TO_REQUESTED,
    PREPARING_TO_SAFE_ACCESS_GRANTED,
    "REQUESTED to ACCESS_GRANTED_EMPTY",
    "REQUESTED to BYPASSED",
    REQUESTED_TO_CLOSED,
    "REQUESTED to CLOSED_EMPTY",
    "REQUESTED to OPEN",
    "SAFE_ACCESS_GRANTED to OPEN",
    "SAFE_ACCESS_GRANTED to REQUESTED",
    "SAFE_ACCESS_GRANTED to GATE_CLOSED",
    OPEN_TO_CLOSED,
    "CLOSED to SAFE_ACCESS_GRANTED",
    "PREPARING to OPEN",
    "PREPARING to GATE_CLOSED",
    "PREPARING to REQUESTED",
    "CLOSED to GATE_CLOSED",
    "CLOSED to REQUESTED",
    "OPEN to PREPARING",
];

/// Position of a label in [`TRANSITION_CATALOG`], if tracked
pub fn catalog_index(label: &str) -> Option<usize> {
    TRANSITION_CATALOG.iter().position(|entry| *entry == label)
}
