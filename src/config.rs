//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a missing file or a partial file still yields a
//! runnable configuration. The provider API key is referenced by env-var
//! name in the config and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::data::accuweather::MAX_FORECAST_DAYS;
use crate::data::locations::LocationRegistry;
use crate::types::ScopeError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub provider: ProviderConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Static historical dataset (read once at startup)
    pub historical_csv: String,
    /// Append-only observation log
    pub observation_log: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            historical_csv: "UTTRAKHAND_ISRO0019_2012-11-02_2019-01-02_Nov2025_175236.csv".into(),
            observation_log: "current_weather_data.csv".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Timeout for location search, current conditions and today's summary
    pub current_timeout_secs: u64,
    /// Timeout for the daily and hourly forecasts
    pub forecast_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dataservice.accuweather.com".into(),
            api_key_env: "ACCUWEATHER_API_KEY".into(),
            current_timeout_secs: 10,
            forecast_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of forecast days to produce
    pub days: usize,
    /// Location used for `/` and unknown keys
    pub default_location: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: 5,
            default_location: "beluwakhan".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.server.port == 0 {
            return Err(ScopeError::Config("server.port must be non-zero".into()));
        }
        if self.forecast.days == 0 || self.forecast.days > MAX_FORECAST_DAYS {
            return Err(ScopeError::Config(format!(
                "forecast.days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast.days
            )));
        }
        if self.provider.current_timeout_secs == 0 || self.provider.forecast_timeout_secs == 0 {
            return Err(ScopeError::Config("provider timeouts must be non-zero".into()));
        }
        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(ScopeError::Config(format!(
                "provider.base_url must be an http(s) URL, got {}",
                self.provider.base_url
            )));
        }
        if LocationRegistry::builtin()
            .get(&self.forecast.default_location)
            .is_none()
        {
            return Err(ScopeError::Config(format!(
                "forecast.default_location is not a known location: {}",
                self.forecast.default_location
            )));
        }
        Ok(())
    }

    /// Resolve the provider API key from the environment. An unset or blank
    /// variable means "no key"; the service then runs on simulated data.
    pub fn provider_api_key(&self) -> Option<SecretString> {
        Self::resolve_env(&self.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::new)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
