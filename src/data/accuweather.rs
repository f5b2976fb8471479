//! AccuWeather live provider.
//!
//! Current conditions, today's summary, 5-day daily and 12-hour hourly
//! forecasts. All unit conversion (km/h to m/s) and rounding happens here so
//! the rest of the crate only ever sees metric, one-decimal values.
//!
//! API: `https://dataservice.accuweather.com`
//! Auth: `apikey` query parameter.
//! Rate limit: 50 calls/day on the free tier.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::synthetic::{PLACEHOLDER_SUNRISE, PLACEHOLDER_SUNSET};
use super::WeatherProvider;
use crate::config::ProviderConfig;
use crate::types::{
    kmh_to_ms, round1, DataSource, FetchError, ForecastDay, HourlyReading, LocationProfile,
    WeatherSnapshot,
};

const HOURLY_LIMIT: usize = 8;

/// Days returned by the `5day` daily endpoint.
pub const MAX_FORECAST_DAYS: usize = 5;

// ---------------------------------------------------------------------------
// AccuWeather response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LocationSearchResult {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Measurement {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricMeasurement {
    metric: Measurement,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WindDirection {
    #[serde(default)]
    localized: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurrentWind {
    speed: MetricMeasurement,
    #[serde(default)]
    direction: Option<WindDirection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurrentConditions {
    #[serde(default)]
    local_observation_date_time: Option<String>,
    temperature: MetricMeasurement,
    #[serde(default)]
    real_feel_temperature: Option<MetricMeasurement>,
    #[serde(default)]
    relative_humidity: Option<f64>,
    wind: CurrentWind,
    pressure: MetricMeasurement,
    #[serde(default)]
    visibility: Option<MetricMeasurement>,
    #[serde(default)]
    cloud_cover: Option<f64>,
    #[serde(default)]
    weather_text: Option<String>,
    #[serde(default, rename = "UVIndex")]
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DailyForecastResponse {
    daily_forecasts: Vec<DailyForecast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemperatureRange {
    minimum: Measurement,
    maximum: Measurement,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HumidityStats {
    #[serde(default)]
    average: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ForecastWind {
    speed: Measurement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DayPart {
    #[serde(default)]
    icon_phrase: Option<String>,
    #[serde(default)]
    relative_humidity: Option<HumidityStats>,
    #[serde(default)]
    wind: Option<ForecastWind>,
    #[serde(default)]
    cloud_cover: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SunTimes {
    #[serde(default)]
    rise: Option<String>,
    #[serde(default)]
    set: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MoonInfo {
    #[serde(default)]
    phase: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DailyForecast {
    date: String,
    temperature: TemperatureRange,
    #[serde(default)]
    day: DayPart,
    #[serde(default)]
    night: DayPart,
    #[serde(default)]
    sun: Option<SunTimes>,
    #[serde(default)]
    moon: Option<MoonInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HourlyForecast {
    date_time: String,
    temperature: Measurement,
    #[serde(default)]
    relative_humidity: Option<f64>,
    wind: ForecastWind,
    #[serde(default)]
    icon_phrase: Option<String>,
    #[serde(default)]
    cloud_cover: Option<f64>,
}

/// Fields of a snapshot that come from the 1-day summary.
#[derive(Debug, Clone, PartialEq)]
struct TodaySummary {
    min_temp: f64,
    max_temp: f64,
    day_conditions: String,
    night_conditions: String,
    sunrise: String,
    sunset: String,
    moon_phase: String,
}

impl TodaySummary {
    /// Stand-in used when the summary call fails.
    fn derived_from(temperature: f64) -> Self {
        Self {
            min_temp: round1(temperature - 5.0),
            max_temp: round1(temperature + 3.0),
            day_conditions: "Fair".into(),
            night_conditions: "Clear".into(),
            sunrise: PLACEHOLDER_SUNRISE.into(),
            sunset: PLACEHOLDER_SUNSET.into(),
            moon_phase: "N/A".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct AccuWeatherClient {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
    current_timeout: Duration,
    forecast_timeout: Duration,
}

impl AccuWeatherClient {
    pub fn new(cfg: &ProviderConfig, api_key: Option<SecretString>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = Client::builder()
            .user_agent("SCOPECAST/0.1.0")
            .build()
            .context("Failed to build AccuWeather HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            current_timeout: Duration::from_secs(cfg.current_timeout_secs),
            forecast_timeout: Duration::from_secs(cfg.forecast_timeout_secs),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .ok_or(FetchError::MissingApiKey)
    }

    /// GET `path` with the API key plus `query`, decoding the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, path);

        let resp = self
            .http
            .get(&url)
            .query(&[("apikey", key)])
            .query(query)
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        debug!(path, status = status.as_u16(), "AccuWeather response");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(format!("{path}: {e}")))
    }

    /// Static id first, else a city search by display name.
    async fn resolve_location_id(&self, profile: &LocationProfile) -> Result<String, FetchError> {
        if let Some(id) = &profile.provider_location_id {
            return Ok(id.clone());
        }

        let results: Vec<LocationSearchResult> = self
            .get_json(
                "locations/v1/cities/search",
                &[("q", profile.display_name.as_str())],
                self.current_timeout,
            )
            .await?;

        let key = results
            .into_iter()
            .next()
            .map(|r| r.key)
            .ok_or_else(|| FetchError::UnresolvedLocation(profile.display_name.clone()))?;
        debug!(location = %profile.display_name, key = %key, "Resolved provider location id");
        Ok(key)
    }

    async fn today_summary(&self, location_id: &str) -> Result<TodaySummary, FetchError> {
        let path = format!("forecasts/v1/daily/1day/{}", urlencoding::encode(location_id));
        let resp: DailyForecastResponse = self
            .get_json(&path, &[("details", "true"), ("metric", "true")], self.current_timeout)
            .await?;
        let today = resp
            .daily_forecasts
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed("empty daily forecast".into()))?;

        let sun = today.sun.unwrap_or(SunTimes { rise: None, set: None });
        Ok(TodaySummary {
            min_temp: round1(today.temperature.minimum.value),
            max_temp: round1(today.temperature.maximum.value),
            day_conditions: today.day.icon_phrase.unwrap_or_else(|| "N/A".into()),
            night_conditions: today.night.icon_phrase.unwrap_or_else(|| "N/A".into()),
            sunrise: sun.rise.as_deref().map(clock_time).unwrap_or_else(|| "N/A".into()),
            sunset: sun.set.as_deref().map(clock_time).unwrap_or_else(|| "N/A".into()),
            moon_phase: today
                .moon
                .and_then(|m| m.phase)
                .unwrap_or_else(|| "N/A".into()),
        })
    }
}

/// Local `HH:MM` from an ISO-8601 timestamp; unparseable input is passed through.
fn clock_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Provider percentages (cloud cover, UV) as small integers.
fn as_u8(value: Option<f64>) -> u8 {
    value.unwrap_or(0.0).round().clamp(0.0, 255.0) as u8
}

fn build_snapshot(
    profile: &LocationProfile,
    current: CurrentConditions,
    today: TodaySummary,
) -> WeatherSnapshot {
    let temperature = round1(current.temperature.metric.value);
    let observed_at: DateTime<FixedOffset> = current
        .local_observation_date_time
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .unwrap_or_else(|| Local::now().fixed_offset());

    WeatherSnapshot {
        location_name: profile.display_name.clone(),
        observed_at,
        temperature,
        feels_like: current
            .real_feel_temperature
            .map(|m| round1(m.metric.value))
            .unwrap_or(temperature),
        humidity: current.relative_humidity.unwrap_or(50.0),
        wind_speed: kmh_to_ms(current.wind.speed.metric.value),
        wind_direction: current
            .wind
            .direction
            .and_then(|d| d.localized)
            .unwrap_or_else(|| "N/A".into()),
        pressure: round1(current.pressure.metric.value),
        visibility: current.visibility.map(|v| v.metric.value).unwrap_or(10.0),
        cloud_cover: as_u8(current.cloud_cover),
        weather_text: current.weather_text.unwrap_or_else(|| "Clear".into()),
        uv_index: as_u8(current.uv_index),
        today_min_temp: today.min_temp,
        today_max_temp: today.max_temp,
        today_day_conditions: today.day_conditions,
        today_night_conditions: today.night_conditions,
        sunrise: today.sunrise,
        sunset: today.sunset,
        moon_phase: today.moon_phase,
        source: DataSource::Live,
    }
}

fn map_forecast_day(day: DailyForecast) -> Result<ForecastDay, FetchError> {
    let date = day
        .date
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| FetchError::Malformed(format!("bad forecast date {}", day.date)))?;
    let wind = day
        .day
        .wind
        .ok_or_else(|| FetchError::Malformed(format!("no wind for {date}")))?;

    Ok(ForecastDay {
        date,
        min_temp: round1(day.temperature.minimum.value),
        max_temp: round1(day.temperature.maximum.value),
        humidity: day
            .day
            .relative_humidity
            .and_then(|h| h.average)
            .unwrap_or(50.0),
        wind_speed: kmh_to_ms(wind.speed.value),
        conditions: day.day.icon_phrase.unwrap_or_else(|| "N/A".into()),
        cloud_cover: as_u8(day.day.cloud_cover),
    })
}

fn map_hour(hour: HourlyForecast) -> Result<HourlyReading, FetchError> {
    let time = DateTime::parse_from_rfc3339(&hour.date_time)
        .map(|dt| dt.format("%H:%M").to_string())
        .map_err(|e| FetchError::Malformed(format!("bad hourly timestamp {}: {e}", hour.date_time)))?;

    Ok(HourlyReading {
        time,
        temperature: round1(hour.temperature.value),
        humidity: hour.relative_humidity.unwrap_or(50.0),
        wind_speed: kmh_to_ms(hour.wind.speed.value),
        conditions: hour.icon_phrase.unwrap_or_else(|| "N/A".into()),
        cloud_cover: as_u8(hour.cloud_cover),
    })
}

#[async_trait]
impl WeatherProvider for AccuWeatherClient {
    async fn current_conditions(
        &self,
        profile: &LocationProfile,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.api_key()?;
        let location_id = self.resolve_location_id(profile).await?;

        let path = format!("currentconditions/v1/{}", urlencoding::encode(&location_id));
        let current: Vec<CurrentConditions> = self
            .get_json(&path, &[("details", "true")], self.current_timeout)
            .await?;
        let current = current
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed("empty current conditions".into()))?;

        let today = match self.today_summary(&location_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(location = %profile.display_name, error = %e, "Today's summary unavailable, deriving from current temperature");
                TodaySummary::derived_from(round1(current.temperature.metric.value))
            }
        };

        Ok(build_snapshot(profile, current, today))
    }

    async fn daily_forecast(
        &self,
        profile: &LocationProfile,
        days: usize,
    ) -> Result<Vec<ForecastDay>, FetchError> {
        self.api_key()?;
        let location_id = self.resolve_location_id(profile).await?;

        let path = format!("forecasts/v1/daily/5day/{}", urlencoding::encode(&location_id));
        let resp: DailyForecastResponse = self
            .get_json(&path, &[("details", "true"), ("metric", "true")], self.forecast_timeout)
            .await?;

        if resp.daily_forecasts.len() < days {
            return Err(FetchError::Malformed(format!(
                "expected {days} forecast days, got {}",
                resp.daily_forecasts.len()
            )));
        }

        resp.daily_forecasts
            .into_iter()
            .take(days)
            .map(map_forecast_day)
            .collect()
    }

    async fn hourly_forecast(
        &self,
        profile: &LocationProfile,
    ) -> Result<Vec<HourlyReading>, FetchError> {
        self.api_key()?;
        let location_id = self.resolve_location_id(profile).await?;

        let path = format!("forecasts/v1/hourly/12hour/{}", urlencoding::encode(&location_id));
        let hours: Vec<HourlyForecast> = self
            .get_json(&path, &[("details", "true"), ("metric", "true")], self.forecast_timeout)
            .await?;

        hours.into_iter().take(HOURLY_LIMIT).map(map_hour).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
