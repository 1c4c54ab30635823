//! Error types for the analysis pipeline
//!
//! Per-line and per-visitor errors never leave their stage: the scan and the
//! region attribution log them and move on. Only `ScanError` and
//! `ReportError` (and `GeoError::Open`) end a run.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// A log line that does not have the fixed-column shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
}

/// A single field of an otherwise usable line that could not be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid timestamp `{raw}`: {source}")]
    Timestamp {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("timestamp `{raw}` is not bracketed")]
    TimestampBracket { raw: String },
    #[error("invalid byte count `{raw}`: {source}")]
    Bytes {
        raw: String,
        #[source]
        source: ParseIntError,
    },
}

/// Failure to attribute a visitor address to a region
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("`{0}` is not an IP address")]
    InvalidAddress(String),
    #[error("{0} is in a reserved range")]
    Reserved(std::net::IpAddr),
    #[error("no location record for {0}")]
    NotFound(std::net::IpAddr),
    #[error("lookup failed: {0}")]
    Lookup(#[from] maxminddb::MaxMindDbError),
    #[error("cannot open GeoIP database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: maxminddb::MaxMindDbError,
    },
}

/// Reading the log source failed mid-scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("output directory `{0}` already exists")]
    OutputExists(PathBuf),
    #[error("template directory `{0}` not found")]
    TemplateMissing(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk template directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to serialize report data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CounterError {
    #[error("key `{0}` not found")]
    NotFound(String),
    #[error("invalid sort direction `{0}`, expected `asc` or `desc`")]
    Direction(String),
}
