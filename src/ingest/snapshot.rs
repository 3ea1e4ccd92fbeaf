//! Edge timing from bit-vector snapshots
//!
//! Some controllers log the whole state of a zone as one bit vector per
//! signal, e.g. `Z1 dwy req 0 0 1 0`. Comparing consecutive snapshots of the
//! same channel yields per-position edges: a request rising `0 -> 1` starts
//! an episode, a door or key falling `1 -> 0` ends it, and a driveway state
//! entering `C` marks it closed.
//!
//! Every channel carries its own [`ChannelState`]. States are plain values
//! advanced by [`advance`]; channels never observe each other.

use chrono::{DateTime, FixedOffset};
use csv::WriterBuilder;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

use crate::cycles::elapsed_seconds;
use crate::pipeline::PipelineResult;
use crate::types::LocationKind;

/// Level snapshots carry two trailing status bits after the positions
pub const LEVEL_POSITIONS: usize = 10;

const SNAPSHOT_PATTERN: &str =
    r"(?:\bZ(?P<zone>\d+) (?P<area>dwy|aisle)|\b(?P<level>level)) (?P<signal>req|door|state|key)\b(?P<bits>.*)$";

fn snapshot_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SNAPSHOT_PATTERN).expect("snapshot pattern is valid"))
}

/// Part of the structure a snapshot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapshotArea {
    /// Driveways of a zone
    Driveway(u32),
    /// Aisles of a zone
    Aisle(u32),
    /// All levels
    Level,
}

impl SnapshotArea {
    /// Location type of the area
    pub fn kind(&self) -> LocationKind {
        match self {
            SnapshotArea::Driveway(_) => LocationKind::Driveway,
            SnapshotArea::Aisle(_) => LocationKind::Aisle,
            SnapshotArea::Level => LocationKind::Level,
        }
    }

    /// Position label as reported, one-based
    pub fn position_label(&self, index: usize) -> String {
        match self {
            SnapshotArea::Driveway(zone) | SnapshotArea::Aisle(zone) => format!("Z{}-{}", zone, index + 1),
            SnapshotArea::Level => format!("{}", index + 1),
        }
    }
}

/// Signal carried by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    /// Access request bits
    Request,
    /// Driveway door bits
    Door,
    /// Driveway state characters
    State,
    /// Aisle or level key bits
    Key,
}

impl Signal {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "req" => Some(Signal::Request),
            "door" => Some(Signal::Door),
            "state" => Some(Signal::State),
            "key" => Some(Signal::Key),
            _ => None,
        }
    }

    /// Whether the step `before -> after` of one position is an edge
    pub fn is_edge(&self, before: char, after: char) -> bool {
        match self {
            Signal::Request => before == '0' && after == '1',
            Signal::Door | Signal::Key => before == '1' && after == '0',
            Signal::State => before != 'C' && after == 'C',
        }
    }
}

/// One independent snapshot stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel {
    /// Area the snapshot covers
    pub area: SnapshotArea,
    /// Signal the snapshot carries
    pub signal: Signal,
}

/// One parsed snapshot line
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Channel of the snapshot
    pub channel: Channel,
    /// Time of the snapshot
    pub timestamp: DateTime<FixedOffset>,
    /// Per-position symbols, whitespace removed
    pub symbols: Vec<char>,
}

impl Snapshot {
    /// Parse a snapshot line; `None` for any other line
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim().trim_matches('"');
        let caps = snapshot_regex().captures(line)?;

        let area = if caps.name("level").is_some() {
            SnapshotArea::Level
        } else {
            let zone = caps.name("zone")?.as_str().parse().ok()?;
            match caps.name("area")?.as_str() {
                "dwy" => SnapshotArea::Driveway(zone),
                _ => SnapshotArea::Aisle(zone),
            }
        };
        let signal = Signal::parse(&caps["signal"])?;

        let timestamp = match DateTime::parse_from_rfc3339(line.split_whitespace().next()?) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                debug!(error = %e, "Dropping snapshot with unparseable timestamp");
                return None;
            }
        };

        let mut symbols: Vec<char> = caps["bits"].chars().filter(|c| !c.is_whitespace()).collect();
        if area == SnapshotArea::Level {
            symbols.truncate(LEVEL_POSITIONS);
        }

        Some(Self { channel: Channel { area, signal }, timestamp, symbols })
    }
}

/// Scan state of one channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    /// Symbols of the previous snapshot
    pub previous: Option<Vec<char>>,
    /// Latest edge time per position
    pub edges: BTreeMap<usize, DateTime<FixedOffset>>,
}

/// Next state of a channel after one snapshot
///
/// The first snapshot of a channel only primes it. Positions are compared
/// pairwise up to the shorter of the two vectors; a later edge at a position
/// replaces an earlier one.
pub fn advance(state: &ChannelState, signal: Signal, snapshot: &Snapshot) -> ChannelState {
    let mut edges = state.edges.clone();

    if let Some(previous) = &state.previous {
        for (index, (before, after)) in previous.iter().zip(&snapshot.symbols).enumerate() {
            if signal.is_edge(*before, *after) {
                edges.insert(index, snapshot.timestamp);
            }
        }
    }

    ChannelState { previous: Some(snapshot.symbols.clone()), edges }
}

/// Per-position timing row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeTiming {
    /// Location type
    #[serde(rename = "Type")]
    pub kind: LocationKind,
    /// Position label, `Z<zone>-<n>` or `<n>` for levels
    #[serde(rename = "Position")]
    pub position: String,
    /// Latest request edge
    #[serde(rename = "Start_Time")]
    pub start_time: DateTime<FixedOffset>,
    /// Seconds from request to door closed (driveways)
    #[serde(rename = "Req_to_Door_s")]
    pub req_to_door_s: Option<f64>,
    /// Seconds from request to state `C` (driveways)
    #[serde(rename = "Req_to_C_s")]
    pub req_to_c_s: Option<f64>,
    /// Seconds from request to key released (aisles and levels)
    #[serde(rename = "Req_to_Key_s")]
    pub req_to_key_s: Option<f64>,
}

/// All channel states of one scan
#[derive(Debug, Clone, Default)]
pub struct SnapshotScan {
    channels: BTreeMap<Channel, ChannelState>,
    snapshots: usize,
}

impl SnapshotScan {
    /// Start an empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every snapshot line, ignoring all other lines
    #[instrument(skip_all)]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scan = lines
            .into_iter()
            .filter_map(|line| Snapshot::parse(line.as_ref()))
            .fold(Self::new(), |scan, snapshot| scan.with_snapshot(&snapshot));

        info!("Scanned {} snapshots across {} channels", scan.snapshots, scan.channels.len());
        scan
    }

    /// Scan with one more snapshot applied
    pub fn with_snapshot(mut self, snapshot: &Snapshot) -> Self {
        let next = {
            let current = self.channels.get(&snapshot.channel).cloned().unwrap_or_default();
            advance(&current, snapshot.channel.signal, snapshot)
        };
        self.channels.insert(snapshot.channel, next);
        self.snapshots += 1;
        self
    }

    /// Number of snapshots applied
    pub fn snapshot_count(&self) -> usize {
        self.snapshots
    }

    fn edge(&self, area: SnapshotArea, signal: Signal, index: usize) -> Option<DateTime<FixedOffset>> {
        self.channels.get(&Channel { area, signal }).and_then(|s| s.edges.get(&index).copied())
    }

    /// Timing rows: driveways by zone, then levels, then aisles by zone
    pub fn timings(&self) -> Vec<EdgeTiming> {
        let mut request_channels: Vec<SnapshotArea> = self
            .channels
            .keys()
            .filter(|channel| channel.signal == Signal::Request)
            .map(|channel| channel.area)
            .collect();
        request_channels.sort_by_key(|area| match area {
            SnapshotArea::Driveway(zone) => (0, *zone),
            SnapshotArea::Level => (1, 0),
            SnapshotArea::Aisle(zone) => (2, *zone),
        });

        let mut rows = Vec::new();
        for area in request_channels {
            let Some(requests) = self.channels.get(&Channel { area, signal: Signal::Request }) else {
                continue;
            };

            for (index, start) in &requests.edges {
                let since_start =
                    |signal: Signal| self.edge(area, signal, *index).map(|end| elapsed_seconds(*start, end));
                let driveway = matches!(area, SnapshotArea::Driveway(_));

                rows.push(EdgeTiming {
                    kind: area.kind(),
                    position: area.position_label(*index),
                    start_time: *start,
                    req_to_door_s: if driveway { since_start(Signal::Door) } else { None },
                    req_to_c_s: if driveway { since_start(Signal::State) } else { None },
                    req_to_key_s: if driveway { None } else { since_start(Signal::Key) },
                });
            }
        }
        rows
    }
}

/// Write timing rows as CSV
pub fn write_edge_timings<W: Write>(writer: W, rows: &[EdgeTiming]) -> PipelineResult<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(["Type", "Position", "Start_Time", "Req_to_Door_s", "Req_to_C_s", "Req_to_Key_s"])?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write timing rows to a CSV file
pub fn write_edge_timings_file(path: &Path, rows: &[EdgeTiming]) -> PipelineResult<()> {
    write_edge_timings(File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote snapshot edge timings");
    Ok(())
}
