//! Line-delimited JSON ingestion.
//!
//! Each input line is one post as delivered by the streaming API. Only two
//! fields are used: `created_at` and `entities.hashtags[].text`. Lines that
//! are not JSON, lack either field, or carry an unreadable timestamp are
//! dropped and counted, so the event log handed to the engine is always
//! well-formed.

use crate::event::EventLog;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Timestamp layout used by the streaming API, e.g. `Thu Oct 29 17:51:01 +0000 2015`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Errors that stop ingestion entirely.
#[derive(Debug)]
pub enum IngestError {
    /// The source could not be opened or read
    Io(std::io::Error),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "Failed to read input: {}", err),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err)
    }
}

/// Why a single record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Line is not a JSON object
    InvalidJson,
    /// No `created_at` field, e.g. rate-limit notices
    MissingTimestamp,
    /// No `entities.hashtags` list
    MissingHashtags,
    /// `created_at` in an unknown layout
    BadTimestamp,
}

/// Result of reading one input source.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Well-formed events, in input order
    pub log: EventLog,
    /// Number of non-blank lines read
    pub lines: usize,
    /// Number of records dropped
    pub dropped: usize,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    created_at: Option<String>,
    entities: Option<RawEntities>,
}

#[derive(Debug, Deserialize)]
struct RawEntities {
    hashtags: Option<Vec<RawHashtag>>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    text: String,
}

/// Parses a `created_at` value, accepting the streaming API layout or RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}

/// Parses one line into a timestamp and its hashtags.
pub fn parse_record(line: &str) -> Result<(DateTime<Utc>, Vec<String>), DropReason> {
    let raw: RawRecord = serde_json::from_str(line).map_err(|_| DropReason::InvalidJson)?;

    let created_at = raw.created_at.ok_or(DropReason::MissingTimestamp)?;
    let hashtags = raw
        .entities
        .and_then(|entities| entities.hashtags)
        .ok_or(DropReason::MissingHashtags)?;
    let timestamp = parse_timestamp(&created_at).ok_or(DropReason::BadTimestamp)?;

    Ok((
        timestamp,
        hashtags.into_iter().map(|hashtag| hashtag.text).collect(),
    ))
}

/// Reads every line of `reader` into an event log.
///
/// # Errors
/// Returns `IngestError::Io` if the reader fails; malformed records are
/// counted in the report instead.
pub fn read_events<R: BufRead>(reader: R) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.lines += 1;

        match parse_record(trimmed) {
            Ok((timestamp, tags)) => {
                report.log.push(timestamp, tags);
            }
            Err(reason) => {
                log::debug!("Dropping line {}: {:?}", line_no + 1, reason);
                report.dropped += 1;
            }
        }
    }

    log::info!(
        "Ingested {} events from {} records",
        report.log.len(),
        report.lines
    );
    if report.dropped > 0 {
        log::warn!(
            "Dropped {} records with missing information",
            report.dropped
        );
    }

    Ok(report)
}

/// Opens `path` and reads it with [`read_events`].
pub fn read_events_from_path<P: AsRef<Path>>(path: P) -> Result<IngestReport, IngestError> {
    let file = File::open(path.as_ref())?;
    log::info!("Reading events from {}", path.as_ref().display());
    read_events(BufReader::new(file))
}
