//! Synthetic weather generator.
//!
//! Produces a plausible snapshot from a location's baseline when live data
//! is unavailable. Temperature is shifted by time of day and season, then
//! every field gets bounded random jitter. The random source is injected so
//! tests can seed it.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use rand::Rng;

use crate::types::{round1, DataSource, LocationProfile, WeatherSnapshot};

const WIND_DIRECTIONS: &[&str] = &["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const VISIBILITY_KM: &[f64] = &[8.0, 10.0, 12.0, 15.0, 18.0];
const SKY_TEXT: &[&str] = &["Clear", "Partly Cloudy", "Fair", "Mostly Clear", "Light Clouds"];
const DAY_CONDITIONS: &[&str] = &["Fair", "Partly Cloudy", "Mostly Sunny"];
const NIGHT_CONDITIONS: &[&str] = &["Clear", "Partly Cloudy", "Fair"];

const MOON_PHASES: [&str; 8] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
];

pub const PLACEHOLDER_SUNRISE: &str = "06:30";
pub const PLACEHOLDER_SUNSET: &str = "18:00";

/// Daytime is 06:00 through 18:59 local.
pub fn is_daytime(hour: u32) -> bool {
    (6..=18).contains(&hour)
}

/// Fixed seasonal temperature offset by calendar month.
pub fn seasonal_offset(month: u32) -> f64 {
    match month {
        12 | 1 | 2 => -3.0,
        3..=5 => 0.0,
        6..=8 => 5.0,
        _ => 1.0,
    }
}

/// Cosmetic moon phase from day-of-month (not astronomical).
pub fn moon_phase(day_of_month: u32) -> &'static str {
    MOON_PHASES[(day_of_month % 8) as usize]
}

fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Build a synthetic snapshot for `profile` at local time `now`.
pub fn synthetic_snapshot<R: Rng + ?Sized>(
    profile: &LocationProfile,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> WeatherSnapshot {
    let daytime = is_daytime(now.hour());
    let time_offset = if daytime {
        rng.gen_range(0.0..=4.0)
    } else {
        rng.gen_range(-4.0..=0.0)
    };
    let base = profile.baseline_temp + time_offset + seasonal_offset(now.month());

    let humidity = (profile.baseline_humidity + rng.gen_range(-10..=10) as f64).clamp(20.0, 90.0);

    WeatherSnapshot {
        location_name: profile.display_name.clone(),
        observed_at: now,
        temperature: round1(base + rng.gen_range(-1.0..=1.0)),
        feels_like: round1(base + rng.gen_range(-2.0..=2.0)),
        humidity,
        wind_speed: round1(profile.baseline_wind + rng.gen_range(-0.8..=0.8)),
        wind_direction: pick(rng, WIND_DIRECTIONS).to_string(),
        pressure: round1(profile.baseline_pressure + rng.gen_range(-3.0..=3.0)),
        visibility: pick(rng, VISIBILITY_KM),
        cloud_cover: rng.gen_range(0..=60),
        weather_text: pick(rng, SKY_TEXT).to_string(),
        uv_index: if daytime { rng.gen_range(0..=8) } else { 0 },
        today_min_temp: round1(base - 6.0),
        today_max_temp: round1(base + 4.0),
        today_day_conditions: pick(rng, DAY_CONDITIONS).to_string(),
        today_night_conditions: pick(rng, NIGHT_CONDITIONS).to_string(),
        sunrise: PLACEHOLDER_SUNRISE.to_string(),
        sunset: PLACEHOLDER_SUNSET.to_string(),
        moon_phase: moon_phase(now.day()).to_string(),
        source: DataSource::Simulated,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::locations::LocationRegistry;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ist(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_seasonal_offset() {
        assert_eq!(seasonal_offset(1), -3.0);
        assert_eq!(seasonal_offset(12), -3.0);
        assert_eq!(seasonal_offset(4), 0.0);
        assert_eq!(seasonal_offset(7), 5.0);
        assert_eq!(seasonal_offset(10), 1.0);
    }

    #[test]
    fn test_moon_phase_cycle() {
        assert_eq!(moon_phase(8), "New Moon");
        assert_eq!(moon_phase(4), "Full Moon");
        assert_eq!(moon_phase(31), "Waning Crescent");
    }

    #[test]
    fn test_daytime_bounds() {
        assert!(!is_daytime(5));
        assert!(is_daytime(6));
        assert!(is_daytime(18));
        assert!(!is_daytime(19));
    }

    #[test]
    fn test_daytime_summer_snapshot_bounds() {
        let reg = LocationRegistry::builtin();
        let profile = reg.get("beluwakhan").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let s = synthetic_snapshot(profile, ist(2026, 7, 4, 12), &mut rng);
            // base in [15.2 + 5, 15.2 + 5 + 4]
            assert!(s.temperature >= 19.2 - 0.05 && s.temperature <= 25.2 + 0.05, "{}", s.temperature);
            assert!(s.humidity >= 55.0 && s.humidity <= 75.0);
            assert!((s.wind_speed - 2.1).abs() <= 0.85);
            assert!((s.pressure - 965.5).abs() <= 3.05);
            assert!(s.cloud_cover <= 60);
            assert!(s.uv_index <= 8);
            assert!(s.today_max_temp - s.today_min_temp > 9.9);
            assert!(WIND_DIRECTIONS.contains(&s.wind_direction.as_str()));
            assert_eq!(s.moon_phase, "Full Moon");
            assert_eq!(s.source, DataSource::Simulated);
        }
    }

    #[test]
    fn test_night_winter_snapshot() {
        let reg = LocationRegistry::builtin();
        let profile = reg.get("nainital").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let s = synthetic_snapshot(profile, ist(2026, 1, 10, 22), &mut rng);
            // base in [12.8 - 3 - 4, 12.8 - 3]
            assert!(s.temperature >= 4.8 - 0.05 && s.temperature <= 10.8 + 0.05);
            assert_eq!(s.uv_index, 0);
            assert_eq!(s.sunrise, "06:30");
            assert_eq!(s.location_name, "Nainital");
        }
    }

    #[test]
    fn test_humidity_is_clamped() {
        let humid = LocationProfile {
            key: "swamp".into(),
            display_name: "Swamp".into(),
            baseline_temp: 20.0,
            baseline_humidity: 99.0,
            baseline_wind: 1.0,
            baseline_pressure: 1000.0,
            provider_location_id: None,
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let s = synthetic_snapshot(&humid, ist(2026, 3, 1, 9), &mut rng);
            assert!(s.humidity <= 90.0);
        }
    }

    #[test]
    fn test_same_seed_same_snapshot() {
        let reg = LocationRegistry::builtin();
        let profile = reg.get("delhi").unwrap();
        let now = ist(2026, 10, 16, 20);
        let a = synthetic_snapshot(profile, now, &mut StdRng::seed_from_u64(42));
        let b = synthetic_snapshot(profile, now, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
