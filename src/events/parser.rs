//! Safety-log line parser
//!
//! Turns one filtered log line into a [`LogEvent`]. Lines that do not
//! describe a location transition are expected noise and are dropped.

use chrono::DateTime;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::{debug, instrument};

use super::log_event::{transition_label, LogEvent};
use crate::types::LocationId;

const TRANSITION_PATTERN: &str = concat!(
    r"(?P<timestamp>[\d\-:T\.]+(?:[+-]\d{2}:\d{2}|Z)) .*?",
    r"(?:Driveway (?P<driveway>\d+), Zone (?P<dzone>\d+), Cell (?P<cell>\d+)",
    r"|Aisle (?P<aisle>\d+), Zone (?P<azone>\d+)",
    r"|Level (?P<level>\d+))",
    r" transitioned from (?P<from>\w+) to (?P<to>\w+)",
);

fn transition_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TRANSITION_PATTERN).expect("transition pattern is valid"))
}

/// Result of parsing a batch of log lines
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Events in arrival order
    pub events: Vec<LogEvent>,
    /// Number of lines that did not describe a transition
    pub skipped_lines: usize,
}

/// Parser for transition lines of the safety log
#[derive(Debug, Clone, Copy, Default)]
pub struct EventParser;

impl EventParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a single line, quoted or not
    ///
    /// Returns `None` when the line does not match or carries an unusable
    /// timestamp or location number.
    pub fn parse_line(&self, line: &str) -> Option<LogEvent> {
        let caps = transition_regex().captures(line)?;

        let timestamp = match DateTime::parse_from_rfc3339(&caps["timestamp"]) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                debug!(timestamp = &caps["timestamp"], error = %e, "Dropping line with unparseable timestamp");
                return None;
            }
        };

        let location = Self::location(&caps)?;

        Some(LogEvent::new(location, timestamp, transition_label(&caps["from"], &caps["to"])))
    }

    /// Parse many lines, keeping events in arrival order
    #[instrument(skip(self, lines))]
    pub fn parse_lines<I, S>(&self, lines: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = ParseOutcome::default();

        for line in lines {
            match self.parse_line(line.as_ref()) {
                Some(event) => outcome.events.push(event),
                None => outcome.skipped_lines += 1,
            }
        }

        debug!(
            "Parsed {} transition events, skipped {} lines",
            outcome.events.len(),
            outcome.skipped_lines
        );
        outcome
    }

    /// Canonicalize the mutually exclusive location groups
    fn location(caps: &Captures<'_>) -> Option<LocationId> {
        let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

        if caps.name("driveway").is_some() {
            Some(LocationId::driveway(number("dzone")?, number("cell")?, number("driveway")?))
        } else if caps.name("aisle").is_some() {
            Some(LocationId::aisle(number("azone")?, number("aisle")?))
        } else if caps.name("level").is_some() {
            Some(LocationId::level(number("level")?))
        } else {
            None
        }
    }
}
