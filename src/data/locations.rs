//! Known observing locations and their baseline climate.
//!
//! The registry is built once at startup and shared read-only. Lookups are
//! by short lowercase key (`"nainital"`); display names are what appears in
//! snapshots and the observation log.

use crate::types::LocationProfile;

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

struct KnownLocation {
    key: &'static str,
    name: &'static str,
    temp: f64,
    humidity: f64,
    wind: f64,
    pressure: f64,
    provider_id: Option<&'static str>,
}

const LOCATIONS: &[KnownLocation] = &[
    KnownLocation { key: "beluwakhan", name: "Beluwakhan", temp: 15.2, humidity: 65.0, wind: 2.1, pressure: 965.5, provider_id: Some("2295019") },
    KnownLocation { key: "nainital", name: "Nainital", temp: 12.8, humidity: 58.0, wind: 1.8, pressure: 967.2, provider_id: Some("202396") },
    // Shares Nainital's provider id, so live Delhi readings are Nainital's
    KnownLocation { key: "delhi", name: "Delhi", temp: 22.5, humidity: 72.0, wind: 3.2, pressure: 1013.2, provider_id: Some("202396") },
    KnownLocation { key: "mumbai", name: "Mumbai", temp: 28.1, humidity: 78.0, wind: 2.8, pressure: 1012.8, provider_id: Some("204842") },
];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable lookup table of location profiles, in display order.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    profiles: Vec<LocationProfile>,
}

impl LocationRegistry {
    /// The four built-in observing sites.
    pub fn builtin() -> Self {
        let profiles = LOCATIONS
            .iter()
            .map(|loc| LocationProfile {
                key: loc.key.to_string(),
                display_name: loc.name.to_string(),
                baseline_temp: loc.temp,
                baseline_humidity: loc.humidity,
                baseline_wind: loc.wind,
                baseline_pressure: loc.pressure,
                provider_location_id: loc.provider_id.map(str::to_string),
            })
            .collect();
        Self { profiles }
    }

    /// Case-insensitive lookup by key.
    pub fn get(&self, key: &str) -> Option<&LocationProfile> {
        let key = key.trim();
        self.profiles
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
    }

    pub fn all(&self) -> &[LocationProfile] {
        &self.profiles
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
