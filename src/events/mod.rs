//! Safety-log transition events
//!
//! This module parses filtered safety-log lines into structured transition
//! events.
//!
//! # Overview
//!
//! - **LogEvent**: one `(location, timestamp, transition)` triple
//! - **EventParser**: matches driveway, aisle and level transition lines and
//!   silently drops everything else
//!
//! # Usage Example
//!
//! ```rust
//! use safe_access_timing::events::*;
//! use safe_access_timing::types::LocationId;
//!
//! let parser = EventParser::new();
//! let event = parser
//!     .parse_line("2025-07-09T03:56:54.082-04:00 botguardian2 <info> Level 3 transitioned from OPEN to CLOSED")
//!     .unwrap();
//!
//! assert_eq!(event.location, LocationId::level(3));
//! assert!(event.is_cycle_start());
//! ```

pub mod log_event;
pub mod parser;

// Re-export all public types for convenience
pub use log_event::*;
pub use parser::*;
