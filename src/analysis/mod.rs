//! Single-pass aggregation of access log lines into traffic statistics

pub mod counter;
pub mod days;
pub mod parser;

use std::collections::HashMap;
use std::io::BufRead;

use tracing::{debug, info};

use crate::error::ScanError;
use counter::OrderedCounter;
use days::DayIndex;
use parser::{parse_line, LogRecord};

/// Tallies for one day bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayStats {
    pub hits: u64,
    pub bytes: u64,
    pub visitors: HashMap<String, u64>,
    pub statuses: HashMap<String, u64>,
}

/// Result of a completed scan. Read-only once produced.
#[derive(Debug, Default)]
pub struct Analysis {
    /// Day keys in ascending chronological order
    pub days: Vec<String>,
    pub hit_total: u64,
    pub bytes_total: u64,
    pub visitors: HashMap<String, u64>,
    pub statuses: HashMap<String, u64>,
    pub per_day: HashMap<String, DayStats>,
    pub lines_read: u64,
    pub lines_skipped: u64,
}

impl Analysis {
    /// Visitors ordered by key, ready to be sorted for display
    pub fn visitor_counter(&self) -> OrderedCounter {
        OrderedCounter::from_mapping(&self.visitors)
    }

    pub fn day(&self, day: &str) -> Option<&DayStats> {
        self.per_day.get(day)
    }
}

/// Drives the scan and owns all tallies while it runs
#[derive(Debug, Default)]
pub struct Aggregator {
    hit_total: u64,
    bytes_total: u64,
    visitors: HashMap<String, u64>,
    statuses: HashMap<String, u64>,
    per_day: HashMap<String, DayStats>,
    days: DayIndex,
    lines_read: u64,
    lines_skipped: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every line of `reader`. A read error aborts the scan; bytes that
    /// are not valid UTF-8 are replaced and the line is still counted.
    pub fn run<R: BufRead>(mut reader: R) -> Result<Analysis, ScanError> {
        let mut aggregator = Self::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ScanError::Read {
                    line: aggregator.lines_read + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            aggregator.ingest(&String::from_utf8_lossy(trim_newline(&buf)));
        }
        Ok(aggregator.finish())
    }

    /// Count one raw line
    pub fn ingest(&mut self, line: &str) {
        self.lines_read += 1;
        match parse_line(line) {
            Ok(record) => self.count(&record),
            Err(e) => {
                self.lines_skipped += 1;
                debug!("Skipping line {}: {}", self.lines_read, e);
            }
        }
    }

    fn count(&mut self, record: &LogRecord<'_>) {
        if let Err(e) = &record.timestamp {
            debug!("Line {}: {}", self.lines_read, e);
        }
        let day_key = record.day_key();
        self.days.record(&day_key, record.instant());

        let day = self.per_day.entry(day_key).or_default();

        self.hit_total += 1;
        day.hits += 1;

        // u64 totals wrap on overflow, on both sides of the per-day sum
        match &record.bytes {
            Ok(bytes) => {
                self.bytes_total = self.bytes_total.wrapping_add(*bytes);
                day.bytes = day.bytes.wrapping_add(*bytes);
            }
            Err(e) => debug!("Line {}: {}", self.lines_read, e),
        }

        *self.visitors.entry(record.client.to_string()).or_insert(0) += 1;
        *day.visitors.entry(record.client.to_string()).or_insert(0) += 1;

        *self.statuses.entry(record.status.to_string()).or_insert(0) += 1;
        *day.statuses.entry(record.status.to_string()).or_insert(0) += 1;
    }

    /// Close the scan and order the day buckets
    pub fn finish(self) -> Analysis {
        let days = self.days.sorted();
        info!(
            "Scanned {} lines ({} skipped): {} hits over {} days from {} visitors",
            self.lines_read,
            self.lines_skipped,
            self.hit_total,
            days.len(),
            self.visitors.len()
        );
        Analysis {
            days,
            hit_total: self.hit_total,
            bytes_total: self.bytes_total,
            visitors: self.visitors,
            statuses: self.statuses,
            per_day: self.per_day,
            lines_read: self.lines_read,
            lines_skipped: self.lines_skipped,
        }
    }
}

/// Strip a trailing `\n` or `\r\n`
fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
