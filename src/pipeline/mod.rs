//! Pipeline orchestration, reporting and error handling
//!
//! # Overview
//!
//! - **AnalysisPipeline**: runs parser, windower, delta calculator,
//!   distribution analyzer and timeline over one input
//! - **ReportWriter**: serializes the in-memory tables as report files
//! - **RunStatistics**: data-quality counters reported at the end of a run
//! - **PipelineError**: error type shared by every stage
//! - **LoggingConfig**: tracing subscriber setup
//!
//! # Usage Example
//!
//! ```rust
//! use safe_access_timing::pipeline::*;
//! use safe_access_timing::types::AnalysisConfig;
//!
//! let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
//! let output = pipeline.run_lines(&[
//!     "2025-07-09T03:00:00.000-04:00 botguardian2 <info> Level 3 transitioned from OPEN to CLOSED",
//!     "2025-07-09T03:03:20.000-04:00 botguardian2 <info> Level 3 transitioned from PREPARING to SAFE_ACCESS_GRANTED",
//! ]);
//!
//! assert_eq!(output.deltas[0].delta_to_safe_access_granted, Some(200.0));
//! assert_eq!(output.deltas[0].delta_to_gate_closed, None);
//! ```

pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod statistics;
pub mod writer;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use orchestrator::*;
pub use statistics::*;
pub use writer::*;
