//! Raw safety-log filter
//!
//! Keeps the lines that mention one of the include keywords as a whole word
//! and none of the exclude phrases, both case-insensitively. Fully qualified
//! `botguardianN.mservices.*` host names are shortened to `botguardianN`.

use csv::WriterBuilder;
use regex::{Regex, RegexBuilder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, instrument, warn};

use super::source::{read_raw_lines, LOG_ENTRY_HEADER};
use crate::pipeline::{PipelineError, PipelineResult};
use crate::types::FilterConfig;

const HOSTNAME_PATTERN: &str = r"\b(botguardian\d+)\.mservices\.\S+";

fn hostname_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(HOSTNAME_PATTERN).expect("hostname pattern is valid"))
}

/// Shorten `botguardianN.mservices.<domain>` to `botguardianN`
pub fn normalize_hostnames(line: &str) -> String {
    hostname_regex().replace_all(line, "$1").into_owned()
}

/// Result of filtering a set of raw logs
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Kept, trimmed and normalized lines in input order
    pub entries: Vec<String>,
    /// Number of raw lines examined
    pub lines_scanned: usize,
}

/// Keyword filter for raw safety logs
#[derive(Debug, Clone)]
pub struct LogFilter {
    include: Regex,
    exclude: Option<Regex>,
}

impl LogFilter {
    /// Build the filter from its keyword configuration
    pub fn new(config: &FilterConfig) -> PipelineResult<Self> {
        let keywords: Vec<String> = config
            .include_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| regex::escape(k.trim()))
            .collect();
        if keywords.is_empty() {
            return Err(PipelineError::configuration_error("filter needs at least one include keyword"));
        }

        let include = RegexBuilder::new(&format!(r"\b(?:{})\b", keywords.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| PipelineError::configuration_error(format!("invalid include keywords: {e}")))?;

        let phrases: Vec<String> = config
            .exclude_phrases
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(p))
            .collect();
        let exclude = if phrases.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&phrases.join("|"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        PipelineError::configuration_error(format!("invalid exclude phrases: {e}"))
                    })?,
            )
        };

        Ok(Self { include, exclude })
    }

    /// Whether a raw line passes the filter
    pub fn matches(&self, line: &str) -> bool {
        self.include.is_match(line) && !self.exclude.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Filtered form of a raw line, or `None` if it is dropped
    pub fn apply(&self, line: &str) -> Option<String> {
        self.matches(line).then(|| normalize_hostnames(line.trim()))
    }

    /// Filter lines already in memory
    pub fn filter_lines<I, S>(&self, lines: I) -> FilterOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = FilterOutcome::default();
        for line in lines {
            outcome.lines_scanned += 1;
            if let Some(entry) = self.apply(line.as_ref()) {
                outcome.entries.push(entry);
            }
        }
        outcome
    }

    /// Filter raw log files, plain or gzip, concatenated in the given order
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub fn filter_files(&self, paths: &[PathBuf]) -> PipelineResult<FilterOutcome> {
        let mut outcome = FilterOutcome::default();

        for path in paths {
            let lines = read_raw_lines(path)?;
            let file_outcome = self.filter_lines(&lines);
            info!(
                path = %path.display(),
                scanned = file_outcome.lines_scanned,
                kept = file_outcome.entries.len(),
                "Filtered log file"
            );

            outcome.lines_scanned += file_outcome.lines_scanned;
            outcome.entries.extend(file_outcome.entries);
        }

        if outcome.entries.is_empty() {
            warn!("No log lines passed the filter");
        }
        Ok(outcome)
    }
}

/// Write a single-column `Log Entry` table
pub fn write_log_entries<W: Write>(writer: W, entries: &[String]) -> PipelineResult<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record([LOG_ENTRY_HEADER])?;
    for entry in entries {
        csv_writer.write_record([entry.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a `Log Entry` table to a file
pub fn write_log_entries_file(path: &Path, entries: &[String]) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_log_entries(File::create(path)?, entries)?;
    info!(path = %path.display(), entries = entries.len(), "Wrote filtered log");
    Ok(())
}
