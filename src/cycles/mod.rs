//! Access cycle reconstruction
//!
//! This module turns per-location transition events into access cycles and
//! computes elapsed time from each cycle start to its milestones.
//!
//! # Overview
//!
//! - **TRANSITION_CATALOG**: the fixed set of transitions recorded as milestones
//! - **CycleWindower**: groups events by location, orders them by time and
//!   cuts them into `[start_i, start_{i+1})` windows
//! - **AccessCycle**: one window with the earliest timestamp of every catalog label
//! - **DeltaCalculator**: signed seconds from cycle start to each milestone
//!
//! # Usage Example
//!
//! ```rust
//! use chrono::{DateTime, Duration};
//! use safe_access_timing::cycles::*;
//! use safe_access_timing::events::LogEvent;
//! use safe_access_timing::types::LocationId;
//!
//! let t0 = DateTime::parse_from_rfc3339("2025-07-09T03:00:00-04:00").unwrap();
//! let dwy = LocationId::driveway(1, 1, 1);
//! let events = vec![
//!     LogEvent::new(dwy, t0, OPEN_TO_REQUESTED),
//!     LogEvent::new(dwy, t0 + Duration::seconds(30), REQUESTED_TO_CLOSED),
//! ];
//!
//! let outcome = CycleWindower::new().build_cycles(&events);
//! let deltas = DeltaCalculator::new().compute_all(&outcome.cycles);
//!
//! assert_eq!(deltas[0].delta_to_gate_closed, Some(30.0));
//! assert_eq!(deltas[0].delta_to_safe_access_granted, None);
//! ```

pub mod catalog;
pub mod delta;
pub mod windower;

// Re-export all public types for convenience
pub use catalog::*;
pub use delta::*;
pub use windower::*;
