//! Presentation-side analysis of delta records
//!
//! # Overview
//!
//! - **DistributionAnalyzer**: per location type and delta column, a
//!   fixed-width histogram with an overflow bucket plus mean, median, p95
//!   and p99; negative deltas are counted as anomalies and left out
//! - **Timeline**: stacked request to safe-access bars, clipped at zero for
//!   display only, with a text rendering capped at a fixed axis length
//!
//! # Usage Example
//!
//! ```rust
//! use safe_access_timing::analysis::*;
//! use safe_access_timing::cycles::DeltaColumn;
//! use safe_access_timing::types::LocationKind;
//!
//! let report = DistributionAnalyzer::new(60, 1200).analyze(&[]);
//! let dist = report.get(LocationKind::Driveway, DeltaColumn::GateClosed).unwrap();
//!
//! assert_eq!(dist.bucket_counts.len(), 21);
//! assert!(dist.stats.is_none());
//! ```

pub mod distribution;
pub mod timeline;

// Re-export all public types for convenience
pub use distribution::*;
pub use timeline::*;
