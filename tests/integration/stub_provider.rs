//! Stub weather provider for integration testing.
//!
//! Returns fixed live readings for every location, or a forced error,
//! and counts calls. All state is in-memory.

use async_trait::async_trait;
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use scopecast::data::WeatherProvider;
use scopecast::types::*;

/// A deterministic provider with a switchable outage.
pub struct StubProvider {
    reading: Conditions,
    forecast_start: NaiveDate,
    /// If set, all operations will return this status.
    force_status: Mutex<Option<u16>>,
    current_calls: AtomicUsize,
}

impl StubProvider {
    /// Clear skies with the given reading everywhere.
    pub fn live(reading: Conditions) -> Self {
        Self {
            reading,
            forecast_start: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            force_status: Mutex::new(None),
            current_calls: AtomicUsize::new(0),
        }
    }

    /// A provider that fails every call with 503.
    pub fn down() -> Self {
        let stub = Self::live(ideal());
        stub.set_status(503);
        stub
    }

    pub fn set_status(&self, status: u16) {
        *self.force_status.lock().unwrap() = Some(status);
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), FetchError> {
        match *self.force_status.lock().unwrap() {
            Some(status) => Err(FetchError::Status(status)),
            None => Ok(()),
        }
    }
}

/// Conditions that pass every viewing threshold.
pub fn ideal() -> Conditions {
    Conditions {
        temperature: 12.0,
        humidity: 45.0,
        wind_speed: 1.5,
        pressure: 1002.0,
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn current_conditions(
        &self,
        profile: &LocationProfile,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let r = self.reading;
        Ok(WeatherSnapshot {
            location_name: profile.display_name.clone(),
            observed_at: FixedOffset::east_opt(19800)
                .unwrap()
                .with_ymd_and_hms(2026, 10, 16, 21, 0, 0)
                .unwrap(),
            temperature: r.temperature,
            feels_like: r.temperature - 1.0,
            humidity: r.humidity,
            wind_speed: r.wind_speed,
            wind_direction: "NE".into(),
            pressure: r.pressure,
            visibility: 16.1,
            cloud_cover: 5,
            weather_text: "Clear".into(),
            uv_index: 0,
            today_min_temp: r.temperature - 5.0,
            today_max_temp: r.temperature + 3.0,
            today_day_conditions: "Sunny".into(),
            today_night_conditions: "Clear".into(),
            sunrise: "06:21".into(),
            sunset: "17:42".into(),
            moon_phase: "WaxingGibbous".into(),
            source: DataSource::Live,
        })
    }

    async fn daily_forecast(
        &self,
        _profile: &LocationProfile,
        days: usize,
    ) -> Result<Vec<ForecastDay>, FetchError> {
        self.check()?;
        let r = self.reading;
        Ok((0..days)
            .map(|i| ForecastDay {
                date: self.forecast_start + Duration::days(i as i64),
                min_temp: r.temperature - 2.0,
                max_temp: r.temperature + 2.0,
                humidity: r.humidity,
                wind_speed: r.wind_speed,
                conditions: "Clear".into(),
                cloud_cover: 10,
            })
            .collect())
    }

    async fn hourly_forecast(
        &self,
        _profile: &LocationProfile,
    ) -> Result<Vec<HourlyReading>, FetchError> {
        self.check()?;
        let r = self.reading;
        Ok((0..8)
            .map(|h| HourlyReading {
                time: format!("{:02}:00", (18 + h) % 24),
                temperature: r.temperature,
                humidity: r.humidity,
                wind_speed: r.wind_speed,
                conditions: "Clear".into(),
                cloud_cover: 5,
            })
            .collect())
    }
}
