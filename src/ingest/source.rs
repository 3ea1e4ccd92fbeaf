//! Input file access
//!
//! Raw safety logs may be plain text or gzip archives; archives are
//! decompressed while streaming, no side files are written. Filtered logs are
//! single-column `Log Entry` tables.

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::pipeline::{PipelineError, PipelineResult};

/// Header of the filtered log table
pub const LOG_ENTRY_HEADER: &str = "Log Entry";

/// Whether a path names a gzip archive
pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a file for buffered reading, decompressing `.gz` archives
pub fn open_input(path: &Path) -> PipelineResult<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    if is_gzip(path) {
        debug!(path = %path.display(), "Streaming gzip archive");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every line of a raw log, plain or gzip
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the run.
pub fn read_raw_lines(path: &Path) -> PipelineResult<Vec<String>> {
    let mut reader = open_input(path)?;
    let mut lines = Vec::new();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buffer);
        lines.push(line.trim_end_matches(['\r', '\n']).to_string());
    }

    info!(path = %path.display(), lines = lines.len(), "Read raw log");
    Ok(lines)
}

/// Read the lines of a filtered `Log Entry` table
pub fn read_log_entries(path: &Path) -> PipelineResult<Vec<String>> {
    let entries = read_log_entries_from(open_input(path)?)?;
    info!(path = %path.display(), entries = entries.len(), "Read log entries");
    Ok(entries)
}

/// Read the lines of a `Log Entry` table from any reader
///
/// The header row is optional. Rows split by unquoted commas are joined back
/// together, so tables written without quoting still yield whole lines.
pub fn read_log_entries_from<R: Read>(reader: R) -> PipelineResult<Vec<String>> {
    let mut csv_reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

    let mut entries = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record.iter().collect::<Vec<_>>().join(",");

        if index == 0 && line.trim().eq_ignore_ascii_case(LOG_ENTRY_HEADER) {
            continue;
        }
        entries.push(line);
    }

    Ok(entries)
}
