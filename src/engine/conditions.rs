//! Conditions pipeline.
//!
//! Assembles the full conditions payload for one request: snapshot
//! (live, else synthetic), suitability score, historical analytics,
//! forecast (live, else historical analogue, else static baseline), hourly
//! outlook, and the observation log. Every remote failure is absorbed here
//! and logged; callers always get a complete payload.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::history::HistoricalDataset;
use crate::data::locations::LocationRegistry;
use crate::data::synthetic;
use crate::data::WeatherProvider;
use crate::storage::{self, ExportStats, ObservationLog};
use crate::strategy::analytics::{self, DayRecord, HistoricalSummary};
use crate::strategy::{forecast, suitability};
use crate::types::{
    ForecastDay, HourlyReading, LocationProfile, LoggedObservation, Recommendation, ScopeError,
    SuitabilityScore, WeatherSnapshot,
};

/// Rows returned in `saved_weather_data`.
const SAVED_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Which strategy produced the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    Live,
    HistoricalAnalogue,
    StaticBaseline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPrediction {
    pub date: NaiveDate,
    pub score: u8,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourPrediction {
    pub time: String,
    pub score: u8,
    pub recommendation: Recommendation,
}

/// Everything the dashboard needs for one location.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionsReport {
    pub weather: WeatherSnapshot,
    pub prediction: SuitabilityScore,
    pub past_data: HistoricalSummary,
    pub forecast: Vec<ForecastDay>,
    pub forecast_source: ForecastSource,
    pub forecast_predictions: Vec<DayPrediction>,
    pub hourly_today: Vec<HourlyReading>,
    pub hourly_predictions: Vec<HourPrediction>,
    pub historical_records: Vec<DayRecord>,
    pub saved_weather_data: Vec<LoggedObservation>,
    pub locations: Vec<String>,
    pub timestamp: DateTime<FixedOffset>,
}

/// A rendered CSV export.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub body: String,
    pub rows: usize,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct ConditionsService {
    provider: Arc<dyn WeatherProvider>,
    registry: LocationRegistry,
    dataset: HistoricalDataset,
    log: ObservationLog,
    forecast_days: usize,
    default_profile: LocationProfile,
}

impl ConditionsService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        registry: LocationRegistry,
        dataset: HistoricalDataset,
        log: ObservationLog,
        forecast_days: usize,
        default_location: &str,
    ) -> Result<Self, ScopeError> {
        let default_profile = registry
            .get(default_location)
            .cloned()
            .ok_or_else(|| ScopeError::UnknownLocation(default_location.to_string()))?;
        debug!(default = %default_profile, locations = registry.len(), "Conditions service ready");
        Ok(Self {
            provider,
            registry,
            dataset,
            log,
            forecast_days,
            default_profile,
        })
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    /// Look up `key`, falling back to the default location.
    pub fn resolve_location(&self, key: Option<&str>) -> &LocationProfile {
        match key {
            None => &self.default_profile,
            Some(k) => match self.registry.get(k) {
                Some(profile) => profile,
                None => {
                    warn!(location = k, fallback = %self.default_profile.key, "Unknown location, using default");
                    &self.default_profile
                }
            },
        }
    }

    /// Live snapshot, else a synthetic one.
    pub async fn snapshot<R: Rng + Send + ?Sized>(
        &self,
        profile: &LocationProfile,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> WeatherSnapshot {
        let snapshot = match self.provider.current_conditions(profile).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(location = %profile.display_name, reason = %e, "Live conditions unavailable, using simulation");
                synthetic::synthetic_snapshot(profile, now, rng)
            }
        };
        debug!(%snapshot, "Snapshot");
        snapshot
    }

    /// Live daily forecast, else historical analogue, else static baseline.
    pub async fn forecast<R: Rng + Send + ?Sized>(
        &self,
        profile: &LocationProfile,
        today: NaiveDate,
        rng: &mut R,
    ) -> (Vec<ForecastDay>, ForecastSource) {
        let days = self.forecast_days;
        match self.provider.daily_forecast(profile, days).await {
            Ok(live) => return (live, ForecastSource::Live),
            Err(e) => {
                warn!(location = %profile.display_name, reason = %e, "Live forecast unavailable, using historical analogues");
            }
        }

        match forecast::analogue_forecast(&self.dataset, today, days, rng) {
            Some(analogue) => (analogue, ForecastSource::HistoricalAnalogue),
            None => {
                warn!(location = %profile.display_name, "No historical analogues, using static baseline forecast");
                (
                    forecast::static_forecast(profile, today, days, rng),
                    ForecastSource::StaticBaseline,
                )
            }
        }
    }

    /// Live hourly outlook; empty when unavailable.
    pub async fn hourly(&self, profile: &LocationProfile) -> Vec<HourlyReading> {
        match self.provider.hourly_forecast(profile).await {
            Ok(hours) => hours,
            Err(e) => {
                warn!(location = %profile.display_name, reason = %e, "Hourly forecast unavailable");
                Vec::new()
            }
        }
    }

    /// Append one row per location. `requested` is reused for its own
    /// location; the others get fresh snapshots.
    pub async fn record_observations<R: Rng + Send + ?Sized>(
        &self,
        requested: &WeatherSnapshot,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> Vec<LoggedObservation> {
        let stamp = now.naive_local();
        let mut rows = Vec::with_capacity(self.registry.len());
        for profile in self.registry.all() {
            let row = if profile.display_name == requested.location_name {
                LoggedObservation::from_snapshot(requested, stamp)
            } else {
                let snapshot = self.snapshot(profile, now, rng).await;
                LoggedObservation::from_snapshot(&snapshot, stamp)
            };
            rows.push(row);
        }

        if let Err(e) = self.log.append(&rows) {
            warn!(error = %e, "Failed to append observations");
        }
        rows
    }

    /// Build the full payload for `location`.
    pub async fn conditions_report<R: Rng + Send + ?Sized>(
        &self,
        location: Option<&str>,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> ConditionsReport {
        let profile = self.resolve_location(location);
        let today = now.date_naive();

        let weather = self.snapshot(profile, now, rng).await;
        let prediction = suitability::score(&weather.conditions());
        let past_data = analytics::summarize(&self.dataset);
        let (forecast, forecast_source) = self.forecast(profile, today, rng).await;
        let hourly_today = self.hourly(profile).await;
        let historical_records = analytics::records_for_today(&self.dataset, today);

        self.record_observations(&weather, now, rng).await;
        let saved_weather_data = self.log.recent(SAVED_ROWS).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read observation log");
            Vec::new()
        });

        let forecast_predictions = forecast
            .iter()
            .map(|day| {
                let s = suitability::score(&day.conditions_with_pressure(weather.pressure));
                DayPrediction {
                    date: day.date,
                    score: s.score,
                    recommendation: s.recommendation,
                }
            })
            .collect();
        let hourly_predictions = hourly_today
            .iter()
            .map(|hour| {
                let s = suitability::score(&hour.conditions_with_pressure(weather.pressure));
                HourPrediction {
                    time: hour.time.clone(),
                    score: s.score,
                    recommendation: s.recommendation,
                }
            })
            .collect();

        info!(
            location = %profile.display_name,
            source = %weather.source,
            score = prediction.score,
            recommendation = %prediction.recommendation,
            forecast = ?forecast_source,
            "Conditions report built"
        );

        ConditionsReport {
            weather,
            prediction,
            past_data,
            forecast,
            forecast_source,
            forecast_predictions,
            hourly_today,
            hourly_predictions,
            historical_records,
            saved_weather_data,
            locations: self.registry.keys().map(str::to_string).collect(),
            timestamp: now,
        }
    }

    /// Score-annotated CSV of the whole log. With no log yet, a sample of
    /// fresh snapshots is exported instead (and not persisted).
    pub async fn export<R: Rng + Send + ?Sized>(
        &self,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> Result<ExportFile> {
        let rows = match self.log.read_all()? {
            Some(rows) => rows,
            None => {
                info!("No observation log yet, exporting sample snapshots");
                self.sample_rows(now, rng).await
            }
        };

        Ok(ExportFile {
            filename: storage::export_filename(now.naive_local()),
            body: storage::export_csv(&rows)?,
            rows: rows.len(),
        })
    }

    async fn sample_rows<R: Rng + Send + ?Sized>(
        &self,
        now: DateTime<FixedOffset>,
        rng: &mut R,
    ) -> Vec<LoggedObservation> {
        let stamp: NaiveDateTime = now.naive_local();
        let mut rows = Vec::with_capacity(self.registry.len());
        for profile in self.registry.all() {
            let snapshot = self.snapshot(profile, now, rng).await;
            rows.push(LoggedObservation::from_snapshot(&snapshot, stamp));
        }
        rows
    }

    pub fn export_stats(&self) -> Result<ExportStats> {
        self.log.stats()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
