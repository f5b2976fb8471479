//! Historical analytics over the static dataset.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::suitability;
use crate::data::history::HistoricalDataset;
use crate::types::{round1, HistoricalRecord};

const RECORDS_FOR_TODAY_LIMIT: usize = 10;

/// Aggregate statistics over the whole historical dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummary {
    pub total_records: usize,
    pub optimal_days: usize,
    pub optimal_percentage: f64,
    pub avg_temp: f64,
    pub avg_humidity: f64,
    pub avg_wind: f64,
    pub avg_pressure: f64,
}

impl HistoricalSummary {
    /// Fixed stand-in when there is no data to aggregate.
    pub fn placeholder() -> Self {
        Self {
            total_records: 0,
            optimal_days: 0,
            optimal_percentage: 0.0,
            avg_temp: 15.0,
            avg_humidity: 65.0,
            avg_wind: 2.0,
            avg_pressure: 965.0,
        }
    }
}

/// One historical row as shown in the "on this day" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind: Option<f64>,
    pub pressure: Option<f64>,
}

impl From<&HistoricalRecord> for DayRecord {
    fn from(r: &HistoricalRecord) -> Self {
        Self {
            date: r.date,
            temp: r.air_temp.map(round1),
            humidity: r.humidity.map(round1),
            wind: r.wind_speed.map(round1),
            pressure: r.pressure.map(round1),
        }
    }
}

/// Mean of the present values, rounded to one decimal.
fn mean_of(values: impl Iterator<Item = Option<f64>>, default: f64) -> f64 {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        default
    } else {
        round1(sum / n as f64)
    }
}

pub fn summarize(dataset: &HistoricalDataset) -> HistoricalSummary {
    let records = dataset.records();
    if records.is_empty() {
        return HistoricalSummary::placeholder();
    }

    let total_records = records.len();
    let optimal_days = records
        .iter()
        .filter_map(HistoricalRecord::conditions)
        .filter(suitability::is_optimal)
        .count();
    let defaults = HistoricalSummary::placeholder();

    HistoricalSummary {
        total_records,
        optimal_days,
        optimal_percentage: round1(optimal_days as f64 / total_records as f64 * 100.0),
        avg_temp: mean_of(records.iter().map(|r| r.air_temp), defaults.avg_temp),
        avg_humidity: mean_of(records.iter().map(|r| r.humidity), defaults.avg_humidity),
        avg_wind: mean_of(records.iter().map(|r| r.wind_speed), defaults.avg_wind),
        avg_pressure: mean_of(records.iter().map(|r| r.pressure), defaults.avg_pressure),
    }
}

/// Records sharing today's month and day in any year. With no exact match,
/// the first records of the current month stand in. At most ten either way.
pub fn records_for_today(dataset: &HistoricalDataset, today: NaiveDate) -> Vec<DayRecord> {
    let records = dataset.records();
    let same_day: Vec<&HistoricalRecord> = records
        .iter()
        .filter(|r| r.date.month() == today.month() && r.date.day() == today.day())
        .collect();

    let chosen: Vec<&HistoricalRecord> = if same_day.is_empty() {
        records
            .iter()
            .filter(|r| r.date.month() == today.month())
            .collect()
    } else {
        same_day
    };

    chosen
        .into_iter()
        .take(RECORDS_FOR_TODAY_LIMIT)
        .map(DayRecord::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
