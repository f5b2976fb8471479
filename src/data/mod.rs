//! Weather data sources.
//!
//! Defines the `WeatherProvider` trait for live providers, plus the static
//! location table, the historical dataset loader and the synthetic
//! generator used when no live data is available.

pub mod accuweather;
pub mod history;
pub mod locations;
pub mod synthetic;

use async_trait::async_trait;

use crate::types::{FetchError, ForecastDay, HourlyReading, LocationProfile, WeatherSnapshot};

/// Abstraction over a live weather service.
///
/// Every method either returns data or a `FetchError` telling the caller to
/// fall back. Implementations never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions merged with today's summary.
    async fn current_conditions(
        &self,
        profile: &LocationProfile,
    ) -> Result<WeatherSnapshot, FetchError>;

    /// Daily forecast starting tomorrow. Returns exactly `days` entries or
    /// an error.
    async fn daily_forecast(
        &self,
        profile: &LocationProfile,
        days: usize,
    ) -> Result<Vec<ForecastDay>, FetchError>;

    /// Today's hourly forecast (up to 8 hours).
    async fn hourly_forecast(
        &self,
        profile: &LocationProfile,
    ) -> Result<Vec<HourlyReading>, FetchError>;
}
