//! CSV bar feed adapter.
//!
//! Expects a header row followed by `time,open,high,low,close,volume`
//! records. `time` may be Unix milliseconds, an RFC 3339 timestamp or a
//! `YYYY-MM-DD` date (midnight UTC). Rows are returned sorted by time.

use crate::domain::error::DevScriptError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::BarFeed;
use chrono::{DateTime, NaiveDate};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvBarFeed {
    path: PathBuf,
}

impl CsvBarFeed {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parse CSV text held in memory.
    pub fn parse(content: &str) -> Result<Vec<Bar>, DevScriptError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| DevScriptError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let line = row + 2;
            let raw_time = column(&record, 0, "time", line)?;
            let time = parse_time(raw_time).ok_or_else(|| DevScriptError::Data {
                reason: format!("invalid time '{}' on line {}", raw_time, line),
            })?;

            bars.push(Bar {
                time,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

impl BarFeed for CsvBarFeed {
    fn fetch_bars(&self) -> Result<Vec<Bar>, DevScriptError> {
        let content = fs::read_to_string(&self.path).map_err(|e| DevScriptError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let bars = Self::parse(&content)?;
        if bars.is_empty() {
            return Err(DevScriptError::NoData {
                source_name: self.source_name(),
            });
        }
        tracing::info!(path = %self.path.display(), bars = bars.len(), "bars loaded");
        Ok(bars)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

fn column<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, DevScriptError> {
    record.get(index).ok_or_else(|| DevScriptError::Data {
        reason: format!("missing {} column on line {}", name, line),
    })
}

fn number(record: &StringRecord, index: usize, name: &str, line: usize) -> Result<f64, DevScriptError> {
    column(record, index, name, line)?
        .parse()
        .map_err(|e| DevScriptError::Data {
            reason: format!("invalid {} value on line {}: {}", name, line, e),
        })
}

fn parse_time(raw: &str) -> Option<i64> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Some(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
