//! Telescope viewing suitability scoring.
//!
//! Four independent pass/fail criteria, 25 points each. The same criteria
//! define an "optimal" historical record in the analytics module.

use crate::types::{Conditions, Recommendation, SuitabilityScore};

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

pub const MIN_TEMP_C: f64 = 5.0;
pub const MAX_TEMP_C: f64 = 20.0;
/// Exclusive upper bound
pub const MAX_HUMIDITY_PCT: f64 = 70.0;
/// Exclusive upper bound
pub const MAX_WIND_MS: f64 = 3.0;
/// Exclusive lower bound
pub const MIN_PRESSURE_HPA: f64 = 960.0;

const POINTS_PER_CRITERION: u8 = 25;

pub fn temperature_ok(temp: f64) -> bool {
    (MIN_TEMP_C..=MAX_TEMP_C).contains(&temp)
}

pub fn humidity_ok(humidity: f64) -> bool {
    humidity < MAX_HUMIDITY_PCT
}

pub fn wind_ok(wind: f64) -> bool {
    wind < MAX_WIND_MS
}

pub fn pressure_ok(pressure: f64) -> bool {
    pressure > MIN_PRESSURE_HPA
}

/// All four criteria pass.
pub fn is_optimal(c: &Conditions) -> bool {
    temperature_ok(c.temperature)
        && humidity_ok(c.humidity)
        && wind_ok(c.wind_speed)
        && pressure_ok(c.pressure)
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Score one set of conditions. Pure and deterministic.
pub fn score(c: &Conditions) -> SuitabilityScore {
    let checks = [
        (temperature_ok(c.temperature), "✓ Good temperature", "⚠ Temperature not ideal"),
        (humidity_ok(c.humidity), "✓ Low humidity", "⚠ High humidity"),
        (wind_ok(c.wind_speed), "✓ Low wind", "⚠ High wind"),
        (pressure_ok(c.pressure), "✓ Good pressure", "⚠ Low pressure"),
    ];

    let mut total = 0u8;
    let mut factors = Vec::with_capacity(checks.len());
    for (passed, pass_text, fail_text) in checks {
        if passed {
            total += POINTS_PER_CRITERION;
            factors.push(pass_text.to_string());
        } else {
            factors.push(fail_text.to_string());
        }
    }

    SuitabilityScore {
        score: total,
        recommendation: Recommendation::from_score(total),
        factors,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
