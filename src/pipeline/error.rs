//! Error types and handling
//!
//! This module contains the error type shared by every pipeline stage.
//! Malformed log lines, missing milestones and negative deltas are data,
//! not errors; only unusable inputs and failed outputs surface here.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

use crate::types::{ConfigError, ConfigValidationError};

/// Errors that can occur while running the timing pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A secondary report could not be written
    #[error("Output error: {0}")]
    OutputError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigError> for PipelineError {
    fn from(error: ConfigError) -> Self {
        PipelineError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigValidationError> for PipelineError {
    fn from(error: ConfigValidationError) -> Self {
        PipelineError::ConfigurationError(error.to_string())
    }
}

impl PipelineError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an output error
    pub fn output_error(msg: impl Into<String>) -> Self {
        Self::OutputError(msg.into())
    }

    /// Check if the run has to abort
    ///
    /// Everything that reaches this type stops the run except a failed
    /// secondary report, which is logged and skipped.
    pub fn is_fatal(&self) -> bool {
        match self {
            PipelineError::InputNotFound(_) => true,
            PipelineError::ConfigurationError(_) => true,
            PipelineError::OutputError(_) => false,
            PipelineError::IoError(_) => true,
            PipelineError::CsvError(_) => true,
            PipelineError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::InputNotFound(_) => "Input",
            PipelineError::ConfigurationError(_) => "Configuration",
            PipelineError::OutputError(_) => "Output",
            PipelineError::IoError(_) => "IO",
            PipelineError::CsvError(_) => "CSV",
            PipelineError::SerializationError(_) => "Serialization",
        }
    }

    /// Log the error at a level matching its severity
    pub fn log(&self) {
        if self.is_fatal() {
            error!(category = self.category(), "{}", self);
        } else {
            warn!(category = self.category(), "{}", self);
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
