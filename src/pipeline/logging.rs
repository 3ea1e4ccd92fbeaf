//! Logging and tracing configuration
//!
//! Console output goes to stderr so report files and stdout summaries stay
//! clean. File logs roll daily and are always JSON.

use std::io;
use tracing::{info, Level, Subscriber};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A subscriber and the guard of its file writer, if any
pub type BuiltSubscriber = (Box<dyn Subscriber + Send + Sync>, Option<WorkerGuard>);

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether console output is JSON
    pub json_format: bool,
    /// Log file directory; file logging is off when unset
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Whether to emit span open/close events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter, overrides `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_directory: None,
            log_file_prefix: "safe-access-timing".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration selected by the `--debug`, `--verbose` and `--log-dir` flags
    ///
    /// Debug also closes spans, so each pipeline stage reports its duration.
    /// Without either flag only warnings reach the console.
    pub fn from_flags(verbose: bool, debug: bool, log_dir: Option<&str>) -> Self {
        let config = match (debug, verbose) {
            (true, _) => Self::new().with_level(Level::DEBUG).with_span_events(),
            (false, true) => Self::new().with_level(Level::INFO),
            (false, false) => Self::new().with_level(Level::WARN),
        };
        match log_dir {
            Some(dir) => config.with_file_logging(dir),
            None => config,
        }
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON console output
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Also log to daily rolling files in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, BoxError> {
        if let Some(filter) = &self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }

        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level))
        }))
    }

    /// Build the subscriber without installing it
    ///
    /// The returned guard flushes the file writer when dropped and is `None`
    /// when file logging is off.
    pub fn build(&self) -> Result<BuiltSubscriber, BoxError> {
        let console_layer = if self.json_format {
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(self.span_events())
                .boxed()
        } else {
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_target(false)
                .with_span_events(self.span_events())
                .boxed()
        };

        let (file_layer, guard) = match &self.log_directory {
            Some(log_dir) => {
                let (file_writer, guard) = non_blocking(rolling::daily(log_dir, &self.log_file_prefix));
                let layer = fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_span_events(self.span_events());
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let subscriber = Registry::default()
            .with(self.build_filter()?)
            .with(console_layer)
            .with(file_layer);

        Ok((Box::new(subscriber), guard))
    }

    /// Initialize the global tracing subscriber
    ///
    /// Keep the returned guard alive until the process exits; file log lines
    /// still buffered when it drops are written out first.
    pub fn init(self) -> Result<Option<WorkerGuard>, BoxError> {
        let (subscriber, guard) = self.build()?;
        subscriber.try_init()?;

        info!(level = %self.level, file_logging = self.log_directory.is_some(), "Logging initialized");
        Ok(guard)
    }
}

/// Macro for creating a span around one pipeline stage
#[macro_export]
macro_rules! stage_span {
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info_span!(
            "stage",
            stage = $name,
            $($key = $value,)*
        )
    };
    ($name:expr) => {
        tracing::info_span!(
            "stage",
            stage = $name,
        )
    };
}
