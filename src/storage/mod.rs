//! Persistence layer.
//!
//! The observation log is an append-only CSV file. Each conditions request
//! appends one row per location; the export endpoints read it back, either
//! as a score-annotated CSV download or as summary statistics.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::strategy::suitability;
use crate::types::{log_datetime, round2, LoggedObservation};

pub const EXPORT_URL: &str = "/export/weather-data";

// ---------------------------------------------------------------------------
// Observation log
// ---------------------------------------------------------------------------

/// Handle to the on-disk observation log.
#[derive(Debug)]
pub struct ObservationLog {
    path: PathBuf,
    /// Serializes appends from concurrent requests within this process.
    write_lock: Mutex<()>,
}

impl ObservationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append rows, writing the header first if the file is new or empty.
    pub fn append(&self, rows: &[LoggedObservation]) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open observation log {}", self.path.display()))?;
        let is_new = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        for row in rows {
            wtr.serialize(row)
                .context("Failed to serialise observation row")?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to write observation log {}", self.path.display()))?;

        debug!(path = %self.path.display(), rows = rows.len(), "Observations appended");
        Ok(())
    }

    /// Every row in the log, or `None` if the log does not exist yet.
    /// Rows that fail to decode are skipped.
    pub fn read_all(&self) -> Result<Option<Vec<LoggedObservation>>> {
        if !self.exists() {
            return Ok(None);
        }

        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open observation log {}", self.path.display()))?;
        // deserialize() swallows header errors, so read the header up front
        rdr.headers()
            .with_context(|| format!("Failed to read observation log {}", self.path.display()))?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for result in rdr.deserialize::<LoggedObservation>() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| {
                        format!("Failed to read observation log {}", self.path.display())
                    });
                }
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "Skipping unreadable log row");
                }
            }
        }
        if skipped > 0 {
            warn!(path = %self.path.display(), skipped, "Observation log contains unreadable rows");
        }
        Ok(Some(rows))
    }

    /// The last `n` rows, oldest first. An absent log is empty.
    pub fn recent(&self, n: usize) -> Result<Vec<LoggedObservation>> {
        let rows = self.read_all()?.unwrap_or_default();
        let skip = rows.len().saturating_sub(n);
        Ok(rows.into_iter().skip(skip).collect())
    }

    /// Summary of what an export would contain.
    pub fn stats(&self) -> Result<ExportStats> {
        let Some(rows) = self.read_all()? else {
            return Ok(ExportStats::Empty {
                total_records: 0,
                message: "No data available for export",
                export_url: None,
            });
        };

        let size = std::fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat observation log {}", self.path.display()))?
            .len();

        let mut locations_covered: Vec<String> = Vec::new();
        for row in &rows {
            if !locations_covered.contains(&row.location) {
                locations_covered.push(row.location.clone());
            }
        }

        let format = |dt: &NaiveDateTime| dt.format(log_datetime::FORMAT).to_string();
        Ok(ExportStats::Available {
            total_records: rows.len(),
            date_range: DateRange {
                first_record: rows.first().map(|r| format(&r.datetime)),
                last_record: rows.last().map(|r| format(&r.datetime)),
            },
            locations_covered,
            file_size_kb: round2(size as f64 / 1024.0),
            export_url: EXPORT_URL,
        })
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub first_record: Option<String>,
    pub last_record: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportStats {
    Available {
        total_records: usize,
        date_range: DateRange,
        locations_covered: Vec<String>,
        file_size_kb: f64,
        export_url: &'static str,
    },
    Empty {
        total_records: usize,
        message: &'static str,
        export_url: Option<&'static str>,
    },
}

/// One exported row: the logged observation plus its viewing score.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(with = "log_datetime")]
    datetime: NaiveDateTime,
    location: &'a str,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    pressure: f64,
    visibility: f64,
    cloud_cover: u8,
    telescope_score: u8,
}

impl<'a> From<&'a LoggedObservation> for ExportRow<'a> {
    fn from(obs: &'a LoggedObservation) -> Self {
        Self {
            datetime: obs.datetime,
            location: &obs.location,
            temperature: obs.temperature,
            humidity: obs.humidity,
            wind_speed: obs.wind_speed,
            pressure: obs.pressure,
            visibility: obs.visibility,
            cloud_cover: obs.cloud_cover,
            telescope_score: suitability::score(&obs.conditions()).score,
        }
    }
}

/// Render rows as CSV with a trailing `telescope_score` column.
pub fn export_csv(rows: &[LoggedObservation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record([
            "datetime",
            "location",
            "temperature",
            "humidity",
            "wind_speed",
            "pressure",
            "visibility",
            "cloud_cover",
            "telescope_score",
        ])
        .context("Failed to write CSV header")?;
    }
    for row in rows {
        wtr.serialize(ExportRow::from(row))
            .context("Failed to serialise export row")?;
    }
    let bytes = wtr.into_inner().context("Failed to finish CSV export")?;
    String::from_utf8(bytes).context("Export produced invalid UTF-8")
}

/// Download filename stamped with the export time.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("telescope_weather_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
