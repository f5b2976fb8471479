//! Historical dataset loader.
//!
//! Reads the static meteorological CSV once at startup. Dates are tried
//! against four formats in fixed priority order; rows whose date matches
//! none of them are dropped. The four measurement columns are coerced to
//! numbers, with unparseable cells kept as missing values.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::types::{HistoricalRecord, ScopeError};

pub const DATE_COLUMN: &str = "DATE(IST)";
pub const TEMP_COLUMN: &str = "AIR_TEMP(°C)";
pub const HUMIDITY_COLUMN: &str = "HUMIDITY(%)";
pub const WIND_COLUMN: &str = "WIND_SPEED(m/s)";
pub const PRESSURE_COLUMN: &str = "ATMO_PRESSURE(hpa)";

/// Accepted date formats, first match wins.
const DATE_FORMATS: &[&str] = &["%m-%d-%Y", "%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];

// ---------------------------------------------------------------------------
// Parse statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseStats {
    pub total_rows: usize,
    pub parsed_successfully: usize,
    /// Rows dropped because no date format matched
    pub bad_dates: usize,
    /// Rows the CSV reader itself could not decode
    pub malformed_rows: usize,
    /// Measurement cells that failed numeric coercion
    pub missing_values: usize,
}

impl ParseStats {
    pub fn dropped(&self) -> usize {
        self.bad_dates + self.malformed_rows
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The read-only historical record set.
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    records: Vec<HistoricalRecord>,
}

impl HistoricalDataset {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the dataset from disk. Any failure to open or decode the file
    /// yields an empty dataset; callers degrade to their fallbacks.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok((dataset, stats)) => {
                info!(
                    path = %path.display(),
                    records = dataset.len(),
                    dropped = stats.dropped(),
                    missing_values = stats.missing_values,
                    "Historical dataset loaded"
                );
                if let Some((first, last)) = dataset.date_range() {
                    debug!(%first, %last, "Historical date range");
                }
                dataset
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Historical dataset unavailable, continuing with empty dataset");
                Self::empty()
            }
        }
    }

    pub fn load(path: &Path) -> Result<(Self, ParseStats)> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open historical CSV: {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Parse CSV content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, ParseStats)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let date_idx = column(DATE_COLUMN)
            .ok_or_else(|| ScopeError::Dataset(format!("missing column {DATE_COLUMN}")))?;
        let temp_idx = column(TEMP_COLUMN);
        let humidity_idx = column(HUMIDITY_COLUMN);
        let wind_idx = column(WIND_COLUMN);
        let pressure_idx = column(PRESSURE_COLUMN);

        let mut stats = ParseStats::default();
        let mut records = Vec::new();

        for (row_num, row) in rdr.records().enumerate() {
            stats.total_rows += 1;
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    stats.malformed_rows += 1;
                    debug!(row = row_num + 2, error = %e, "Skipping malformed CSV row");
                    continue;
                }
            };

            let Some(date) = row.get(date_idx).and_then(parse_date) else {
                stats.bad_dates += 1;
                continue;
            };

            let mut numeric = |idx: Option<usize>| {
                let value = idx.and_then(|i| row.get(i)).and_then(parse_number);
                if value.is_none() {
                    stats.missing_values += 1;
                }
                value
            };

            records.push(HistoricalRecord {
                date,
                air_temp: numeric(temp_idx),
                humidity: numeric(humidity_idx),
                wind_speed: numeric(wind_idx),
                pressure: numeric(pressure_idx),
            });
            stats.parsed_successfully += 1;
        }

        Ok((Self { records }, stats))
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

/// Try each accepted date format in order.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Coerce a cell to a finite number; anything else is missing.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
