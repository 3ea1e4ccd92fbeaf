//! Safe Access Timing
//!
//! Reconstructs safe-access cycles from safety-controller logs and measures
//! how long each step of a cycle takes.
//!
//! # Overview
//!
//! Locations (driveways, aisles and levels) log every state change as a
//! `transitioned from <FROM> to <TO>` line. This library turns those lines
//! into per-location access cycles, records when each milestone of a cycle
//! was first reached, and reports the elapsed time from request to gate
//! closed, bots localized and safe access granted.
//!
//! ## Key Features
//!
//! - **Log Filtering**: keyword filter and host name normalization for raw logs, plain or gzip
//! - **Cycle Reconstruction**: half-open `[start_i, start_{i+1})` windows per location
//! - **Signed Deltas**: out-of-order timestamps stay visible as negative deltas
//! - **Distributions**: fixed-width histograms and percentiles per location type
//! - **Timeline**: stacked time-to-safe-access bars for display
//! - **Snapshot Timing**: edge detection over bit-vector snapshot lines
//!
//! ## Quick Start
//!
//! ```rust
//! use safe_access_timing::*;
//!
//! let lines = [
//!     "2025-07-09T03:00:00.000-04:00 botguardian2 <info> Driveway 1, Zone 1, Cell 1 transitioned from OPEN to REQUESTED",
//!     "2025-07-09T03:00:30.000-04:00 botguardian2 <info> Driveway 1, Zone 1, Cell 1 transitioned from REQUESTED to CLOSED",
//! ];
//!
//! let pipeline = AnalysisPipeline::new(AnalysisConfig::default())?;
//! let output = pipeline.run_lines(&lines);
//!
//! assert_eq!(output.cycles.len(), 1);
//! assert_eq!(output.deltas[0].delta_to_gate_closed, Some(30.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Location identifiers, location types and configuration
//! - [`events`]: Transition events and the log line parser
//! - [`cycles`]: Transition catalog, cycle windowing and delta calculation
//! - [`analysis`]: Distributions and the access-granted timeline
//! - [`ingest`]: Raw log filter, input files and snapshot edge timing
//! - [`pipeline`]: Orchestration, report writing, statistics, errors and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Ingest    │    │   Events    │    │   Cycles    │
//! │             │    │             │    │             │
//! │ Filter      │───►│ Parser      │───►│ Windower    │
//! │ Source      │    │ LogEvent    │    │ Deltas      │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                                              │
//!                                              ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Pipeline   │    │  Analysis   │
//! │             │    │             │    │             │
//! │ LocationId  │    │ Orchestrator│◄───┤ Histograms  │
//! │ Config      │    │ Writer      │    │ Timeline    │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod analysis;
pub mod cycles;
pub mod events;
pub mod ingest;
pub mod pipeline;
pub mod types;

// Core types and identifiers
pub use types::{
    AnalysisConfig, CliArgs, Command, ConfigError, ConfigValidationError, FilterConfig, LocationId,
    LocationKind, OutputFormat,
};

// Events and cycles
pub use cycles::{AccessCycle, CycleWindower, DeltaCalculator, DeltaColumn, DeltaRecord};
pub use events::{EventParser, LogEvent};

// Analysis
pub use analysis::{DistributionAnalyzer, DistributionReport, Timeline};

// Ingest
pub use ingest::{LogFilter, SnapshotScan};

// Pipeline
pub use pipeline::{
    AnalysisPipeline, LoggingConfig, PipelineError, PipelineOutput, PipelineResult, ReportWriter,
    RunStatistics,
};
