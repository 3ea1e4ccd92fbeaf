//! Raw log ingestion
//!
//! Everything that happens before the analysis pipeline sees a filtered
//! `Log Entry` table, plus the snapshot-based timing that works on the same
//! filtered logs.
//!
//! # Overview
//!
//! - **LogFilter**: keyword include/exclude filter with host name normalization
//! - **source**: plain or gzip input, `Log Entry` table reading
//! - **SnapshotScan**: per-position edge timing from bit-vector snapshots
//!
//! # Usage Example
//!
//! ```rust
//! use safe_access_timing::ingest::*;
//! use safe_access_timing::types::FilterConfig;
//!
//! let filter = LogFilter::new(&FilterConfig::default()).unwrap();
//! let kept = filter.apply(
//!     "2025-07-09T03:00:00.000-04:00 botguardian2.mservices.example.net <info> LockedSetSafeAccessState Level 3 transitioned from OPEN to CLOSED",
//! );
//!
//! assert_eq!(
//!     kept.as_deref(),
//!     Some("2025-07-09T03:00:00.000-04:00 botguardian2 <info> LockedSetSafeAccessState Level 3 transitioned from OPEN to CLOSED")
//! );
//! ```

pub mod filter;
pub mod snapshot;
pub mod source;

// Re-export all public types for convenience
pub use filter::*;
pub use snapshot::*;
pub use source::*;
