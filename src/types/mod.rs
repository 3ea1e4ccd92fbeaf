//! Core types and identifiers for the access timing analysis
//!
//! This module contains the location taxonomy, identifiers and configuration
//! structures used throughout the pipeline.
//!
//! # Overview
//!
//! - **Identifiers**: structural [`LocationId`] for driveways, aisles and levels
//! - **Enums**: [`LocationKind`] (which selects the cycle-start label) and [`OutputFormat`]
//! - **Configuration**: [`AnalysisConfig`] with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use safe_access_timing::types::*;
//!
//! let location = LocationId::driveway(1, 2, 3);
//! assert_eq!(location.kind(), LocationKind::Driveway);
//! assert_eq!(location.kind().cycle_start_label(), "OPEN to REQUESTED");
//!
//! let config = AnalysisConfig {
//!     base_name: "site7".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(config.bucket_count(), 21);
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
