//! Offline forecast strategies.
//!
//! When the live daily forecast is unavailable, a forecast is built from
//! historical analogues: records near today's calendar date supply a mean
//! and spread for temperature, humidity and wind, and each forecast day
//! draws independent normal noise around those means. With no usable
//! history the location's static baseline is jittered instead.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::data::history::HistoricalDataset;
use crate::types::{round1, ForecastDay, HistoricalRecord, LocationProfile};

/// Days either side of today's day-of-month in the narrowest window.
const DAY_WINDOW: u32 = 3;

// ---------------------------------------------------------------------------
// Analogue window
// ---------------------------------------------------------------------------

/// Which widening step produced the analogue records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogueWindow {
    /// Same month, day within ±3 (no wrap across months)
    NearbyDays,
    /// Same month, any day
    Month,
    /// Previous, current and next month
    Season,
}

impl AnalogueWindow {
    /// Widening order.
    const ALL: [AnalogueWindow; 3] = [
        AnalogueWindow::NearbyDays,
        AnalogueWindow::Month,
        AnalogueWindow::Season,
    ];

    pub fn contains(&self, record: &HistoricalRecord, today: NaiveDate) -> bool {
        let month = record.date.month();
        match self {
            AnalogueWindow::NearbyDays => {
                let low = today.day().saturating_sub(DAY_WINDOW);
                let high = today.day() + DAY_WINDOW;
                month == today.month() && (low..=high).contains(&record.date.day())
            }
            AnalogueWindow::Month => month == today.month(),
            AnalogueWindow::Season => season_months(today.month()).contains(&month),
        }
    }
}

/// The three months centred on `month`, wrapping December/January.
pub fn season_months(month: u32) -> [u32; 3] {
    let prev = (month + 10) % 12 + 1;
    let next = month % 12 + 1;
    [prev, month, next]
}

/// Narrowest non-empty window of records around `today`.
pub fn select_window(
    dataset: &HistoricalDataset,
    today: NaiveDate,
) -> Option<(AnalogueWindow, Vec<&HistoricalRecord>)> {
    AnalogueWindow::ALL.into_iter().find_map(|window| {
        let selected: Vec<&HistoricalRecord> = dataset
            .records()
            .iter()
            .filter(|r| window.contains(r, today))
            .collect();
        (!selected.is_empty()).then_some((window, selected))
    })
}

// ---------------------------------------------------------------------------
// Window statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    /// Capped sample standard deviation
    pub spread: f64,
}

impl ColumnStats {
    /// Mean and sample std-dev of the present values. Fewer than two values
    /// fall back to `default_std`; the spread is always capped at `cap`.
    fn from_values(values: &[f64], default_mean: f64, default_std: f64, cap: f64) -> Self {
        let n = values.len();
        let mean = if n == 0 {
            default_mean
        } else {
            values.iter().sum::<f64>() / n as f64
        };
        let std = if n < 2 {
            default_std
        } else {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        };
        Self {
            mean,
            spread: std.min(cap),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub temperature: ColumnStats,
    pub humidity: ColumnStats,
    pub wind: ColumnStats,
}

impl WindowStats {
    pub fn from_records(records: &[&HistoricalRecord]) -> Self {
        let column = |f: fn(&HistoricalRecord) -> Option<f64>| -> Vec<f64> {
            records.iter().filter_map(|r| f(r)).collect()
        };
        Self {
            temperature: ColumnStats::from_values(&column(|r| r.air_temp), 15.0, 3.0, 5.0),
            humidity: ColumnStats::from_values(&column(|r| r.humidity), 65.0, 10.0, 15.0),
            wind: ColumnStats::from_values(&column(|r| r.wind_speed), 2.0, 0.5, 1.0),
        }
    }
}

fn noise<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    match Normal::new(0.0, spread) {
        Ok(dist) if spread > 0.0 => dist.sample(rng),
        _ => 0.0,
    }
}

/// Sky label and cloud-cover range for a forecast day.
fn sky_for<R: Rng + ?Sized>(humidity: f64, wind: f64, rng: &mut R) -> (&'static str, u8) {
    if humidity < 50.0 && wind < 2.0 {
        ("Clear", rng.gen_range(0..20))
    } else if humidity < 70.0 && wind < 3.0 {
        ("Mostly Clear", rng.gen_range(10..40))
    } else {
        ("Partly Cloudy", rng.gen_range(30..70))
    }
}

fn forecast_date(today: NaiveDate, offset: usize) -> NaiveDate {
    today + Duration::days(offset as i64 + 1)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Forecast from historical analogues, or `None` when no window has data.
pub fn analogue_forecast<R: Rng + ?Sized>(
    dataset: &HistoricalDataset,
    today: NaiveDate,
    days: usize,
    rng: &mut R,
) -> Option<Vec<ForecastDay>> {
    let (window, records) = select_window(dataset, today)?;
    let stats = WindowStats::from_records(&records);
    debug!(?window, records = records.len(), ?stats, "Analogue forecast window");

    let forecast = (0..days)
        .map(|i| {
            let temp = stats.temperature.mean + noise(rng, stats.temperature.spread);
            let humidity = (stats.humidity.mean + noise(rng, stats.humidity.spread))
                .round()
                .clamp(20.0, 95.0);
            let wind = round1(stats.wind.mean + noise(rng, stats.wind.spread)).max(0.0);
            let (conditions, cloud_cover) = sky_for(humidity, wind, rng);

            ForecastDay {
                date: forecast_date(today, i),
                min_temp: round1(temp - 3.0),
                max_temp: round1(temp + 4.0),
                humidity,
                wind_speed: wind,
                conditions: conditions.to_string(),
                cloud_cover,
            }
        })
        .collect();
    Some(forecast)
}

const STATIC_CONDITIONS: &[&str] = &["Clear", "Partly Cloudy", "Fair"];

/// Baseline-only forecast. Always succeeds.
pub fn static_forecast<R: Rng + ?Sized>(
    profile: &LocationProfile,
    today: NaiveDate,
    days: usize,
    rng: &mut R,
) -> Vec<ForecastDay> {
    (0..days)
        .map(|i| {
            let temp = profile.baseline_temp + rng.gen_range(-3.0..=3.0);
            ForecastDay {
                date: forecast_date(today, i),
                min_temp: round1(temp - 3.0),
                max_temp: round1(temp + 4.0),
                humidity: profile.baseline_humidity + rng.gen_range(-10..10) as f64,
                wind_speed: round1(profile.baseline_wind + rng.gen_range(-0.5..=0.5)),
                conditions: STATIC_CONDITIONS[rng.gen_range(0..STATIC_CONDITIONS.len())].to_string(),
                cloud_cover: rng.gen_range(0..30),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
