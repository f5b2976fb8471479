//! Shared types for SCOPECAST.
//!
//! These types form the data model used across all modules: historical
//! observations, location baselines, weather snapshots, forecasts and the
//! suitability score derived from them. Everything here is a plain value
//! object; nothing holds shared mutable state.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Round to one decimal place (the precision every reported value uses).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a provider wind speed in km/h to m/s, rounded to one decimal.
pub fn kmh_to_ms(kmh: f64) -> f64 {
    round1(kmh / 3.6)
}

// ---------------------------------------------------------------------------
// Historical data
// ---------------------------------------------------------------------------

/// One row of the static historical dataset.
///
/// The date is always valid (rows with unparseable dates are dropped at
/// load time). Measurements that failed numeric coercion are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    /// Air temperature in °C
    pub air_temp: Option<f64>,
    /// Relative humidity in %
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Atmospheric pressure in hPa
    pub pressure: Option<f64>,
}

impl HistoricalRecord {
    /// Scorer input for this record, if all four measurements are present.
    pub fn conditions(&self) -> Option<Conditions> {
        Some(Conditions {
            temperature: self.air_temp?,
            humidity: self.humidity?,
            wind_speed: self.wind_speed?,
            pressure: self.pressure?,
        })
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// A named location with its static baseline climate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationProfile {
    /// Short lookup key used in URLs (e.g. "nainital")
    pub key: String,
    pub display_name: String,
    pub baseline_temp: f64,
    pub baseline_humidity: f64,
    pub baseline_wind: f64,
    pub baseline_pressure: f64,
    /// Weather provider's identifier for this place, when known ahead of time.
    pub provider_location_id: Option<String>,
}

impl fmt::Display for LocationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1}°C, {:.0}%, {:.1} m/s, {:.1} hPa)",
            self.display_name,
            self.baseline_temp,
            self.baseline_humidity,
            self.baseline_wind,
            self.baseline_pressure,
        )
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// The four measurements the suitability scorer looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
}

/// Three-tier viewing recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Excellent,
    Good,
    Poor,
}

impl Recommendation {
    /// Bucket a 0–100 score: ≥75 Excellent, ≥50 Good, otherwise Poor.
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            Recommendation::Excellent
        } else if score >= 50 {
            Recommendation::Good
        } else {
            Recommendation::Poor
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Excellent => write!(f, "Excellent"),
            Recommendation::Good => write!(f, "Good"),
            Recommendation::Poor => write!(f, "Poor"),
        }
    }
}

/// Result of scoring one set of conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityScore {
    /// 0, 25, 50, 75 or 100
    pub score: u8,
    pub recommendation: Recommendation,
    /// One annotation per criterion, in fixed criterion order
    pub factors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Weather snapshots
// ---------------------------------------------------------------------------

/// Where a snapshot's values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "AccuWeather Live Data")]
    Live,
    #[serde(rename = "Enhanced Simulation (Live Data Unavailable)")]
    Simulated,
}

impl DataSource {
    pub fn is_live(&self) -> bool {
        matches!(self, DataSource::Live)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => write!(f, "AccuWeather Live Data"),
            DataSource::Simulated => write!(f, "Enhanced Simulation (Live Data Unavailable)"),
        }
    }
}

/// One point-in-time reading for a location, live or synthetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "location")]
    pub location_name: String,
    #[serde(rename = "current_time")]
    pub observed_at: DateTime<FixedOffset>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub pressure: f64,
    pub visibility: f64,
    pub cloud_cover: u8,
    pub weather_text: String,
    pub uv_index: u8,
    pub today_min_temp: f64,
    pub today_max_temp: f64,
    pub today_day_conditions: String,
    pub today_night_conditions: String,
    pub sunrise: String,
    pub sunset: String,
    pub moon_phase: String,
    #[serde(rename = "api_source")]
    pub source: DataSource,
}

impl WeatherSnapshot {
    pub fn conditions(&self) -> Conditions {
        Conditions {
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure: self.pressure,
        }
    }
}

impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:.1}°C, {:.0}% RH, {:.1} m/s {}, {:.1} hPa, {} ({})",
            self.location_name,
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.wind_direction,
            self.pressure,
            self.weather_text,
            self.source,
        )
    }
}

// ---------------------------------------------------------------------------
// Forecasts
// ---------------------------------------------------------------------------

/// One day of a multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub conditions: String,
    pub cloud_cover: u8,
}

impl ForecastDay {
    /// Scorer input for the day: mid-range temperature, with the pressure
    /// borrowed from the current snapshot (forecasts carry none).
    pub fn conditions_with_pressure(&self, pressure: f64) -> Conditions {
        Conditions {
            temperature: (self.min_temp + self.max_temp) / 2.0,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure,
        }
    }
}

/// One hour of today's live hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    /// Local "HH:MM"
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub conditions: String,
    pub cloud_cover: u8,
}

impl HourlyReading {
    pub fn conditions_with_pressure(&self, pressure: f64) -> Conditions {
        Conditions {
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure,
        }
    }
}

// ---------------------------------------------------------------------------
// Observation log
// ---------------------------------------------------------------------------

/// One persisted row of the running observation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedObservation {
    #[serde(with = "log_datetime")]
    pub datetime: NaiveDateTime,
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub visibility: f64,
    pub cloud_cover: u8,
}

impl LoggedObservation {
    pub fn from_snapshot(snapshot: &WeatherSnapshot, datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            location: snapshot.location_name.clone(),
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            wind_speed: snapshot.wind_speed,
            pressure: snapshot.pressure,
            visibility: snapshot.visibility,
            cloud_cover: snapshot.cloud_cover,
        }
    }

    pub fn conditions(&self) -> Conditions {
        Conditions {
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            pressure: self.pressure,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` (de)serialization for log timestamps.
pub mod log_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a live-provider call did not produce data. Every variant is an
/// expected, silently-handled condition that triggers a fallback.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("No weather API key configured")]
    MissingApiKey,

    #[error("No provider location id resolvable for {0}")]
    UnresolvedLocation(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed provider payload: {0}")]
    Malformed(String),
}

/// Domain-specific error types for SCOPECAST.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(-4.06), -4.1);
        assert_eq!(round1(7.0), 7.0);
    }

    #[test]
    fn test_kmh_to_ms() {
        assert_eq!(kmh_to_ms(36.0), 10.0);
        assert_eq!(kmh_to_ms(7.2), 2.0);
        assert_eq!(kmh_to_ms(0.0), 0.0);
    }

    #[test]
    fn test_recommendation_buckets() {
        assert_eq!(Recommendation::from_score(100), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(75), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(74), Recommendation::Good);
        assert_eq!(Recommendation::from_score(50), Recommendation::Good);
        assert_eq!(Recommendation::from_score(49), Recommendation::Poor);
        assert_eq!(Recommendation::from_score(0), Recommendation::Poor);
    }

    #[test]
    fn test_recommendation_serializes_as_label() {
        let json = serde_json::to_string(&Recommendation::Excellent).unwrap();
        assert_eq!(json, "\"Excellent\"");
    }

    #[test]
    fn test_data_source_label() {
        let json = serde_json::to_string(&DataSource::Live).unwrap();
        assert_eq!(json, "\"AccuWeather Live Data\"");
        assert!(DataSource::Simulated.to_string().contains("Simulation"));
        assert!(!DataSource::Simulated.is_live());
    }

    #[test]
    fn test_historical_record_conditions_requires_all_fields() {
        let mut record = HistoricalRecord {
            date: NaiveDate::from_ymd_opt(2015, 3, 4).unwrap(),
            air_temp: Some(10.0),
            humidity: Some(40.0),
            wind_speed: Some(1.0),
            pressure: Some(980.0),
        };
        assert!(record.conditions().is_some());

        record.humidity = None;
        assert!(record.conditions().is_none());
    }

    #[test]
    fn test_forecast_day_uses_mid_temperature() {
        let day = ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            min_temp: 8.0,
            max_temp: 15.0,
            humidity: 55.0,
            wind_speed: 1.5,
            conditions: "Clear".into(),
            cloud_cover: 10,
        };
        let c = day.conditions_with_pressure(970.0);
        assert_eq!(c.temperature, 11.5);
        assert_eq!(c.pressure, 970.0);
    }

    #[test]
    fn test_snapshot_serializes_with_wire_names() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let snapshot = WeatherSnapshot {
            location_name: "Nainital".into(),
            observed_at: offset.with_ymd_and_hms(2026, 1, 2, 21, 0, 0).unwrap(),
            temperature: 9.4,
            feels_like: 8.0,
            humidity: 48.0,
            wind_speed: 1.2,
            wind_direction: "NW".into(),
            pressure: 968.0,
            visibility: 12.0,
            cloud_cover: 5,
            weather_text: "Clear".into(),
            uv_index: 0,
            today_min_temp: 4.0,
            today_max_temp: 14.0,
            today_day_conditions: "Fair".into(),
            today_night_conditions: "Clear".into(),
            sunrise: "06:30".into(),
            sunset: "18:00".into(),
            moon_phase: "Full Moon".into(),
            source: DataSource::Simulated,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["location"], "Nainital");
        assert!(json["current_time"].as_str().unwrap().starts_with("2026-01-02T21:00:00"));
        assert!(json["api_source"].as_str().unwrap().contains("Simulation"));

        assert_eq!(
            snapshot.to_string(),
            "[Nainital] 9.4°C, 48% RH, 1.2 m/s NW, 968.0 hPa, Clear (Enhanced Simulation (Live Data Unavailable))"
        );
    }

    #[test]
    fn test_location_profile_display() {
        let profile = LocationProfile {
            key: "mumbai".into(),
            display_name: "Mumbai".into(),
            baseline_temp: 28.1,
            baseline_humidity: 78.0,
            baseline_wind: 2.8,
            baseline_pressure: 1012.8,
            provider_location_id: None,
        };
        assert_eq!(profile.to_string(), "Mumbai (28.1°C, 78%, 2.8 m/s, 1012.8 hPa)");
    }

    #[test]
    fn test_log_datetime_format() {
        let dt = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        assert_eq!(dt.format(log_datetime::FORMAT).to_string(), "2026-10-16 09:05:03");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FetchError::Status(503).to_string(), "Provider returned HTTP 503");
        assert!(ScopeError::UnknownLocation("mars".into()).to_string().contains("mars"));
    }
}
