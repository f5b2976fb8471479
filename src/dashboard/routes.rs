//! Dashboard route handlers.
//!
//! JSON endpoints plus the CSV download. State is shared via
//! `Arc<DashboardState>`; the only mutable state behind it is the
//! observation log file.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::engine::conditions::{ConditionsReport, ConditionsService};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub service: ConditionsService,
}

impl DashboardState {
    pub fn new(service: ConditionsService) -> Self {
        Self { service }
    }
}

pub type AppState = Arc<DashboardState>;

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/telescope-conditions
pub async fn conditions_default(State(state): State<AppState>) -> Json<ConditionsReport> {
    conditions(state, None).await
}

/// GET /api/telescope-conditions/:location
pub async fn conditions_for(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<ConditionsReport> {
    conditions(state, Some(&location)).await
}

async fn conditions(state: AppState, location: Option<&str>) -> Json<ConditionsReport> {
    let mut rng = StdRng::from_entropy();
    let report = state
        .service
        .conditions_report(location, local_now(), &mut rng)
        .await;
    Json(report)
}

/// GET /export/weather-data
pub async fn export_weather_data(State(state): State<AppState>) -> Response {
    let mut rng = StdRng::from_entropy();
    match state.service.export(local_now(), &mut rng).await {
        Ok(file) => {
            info!(rows = file.rows, filename = %file.filename, "Weather data exported");
            (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={}", file.filename),
                    ),
                ],
                file.body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Export failed: {e}") })),
            )
                .into_response()
        }
    }
}

/// GET /api/export-stats
pub async fn export_stats(State(state): State<AppState>) -> Response {
    match state.service.export_stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!(error = %e, "Export stats failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Export failed: {e}") })),
            )
                .into_response()
        }
    }
}

/// GET /requirements
pub async fn requirements() -> Json<Value> {
    Json(json!({
        "minimum_requirements": {
            "rust": "1.75+",
            "ram": "512MB",
            "storage": "100MB free space",
            "browser": "Chrome 80+, Firefox 75+, Safari 13+",
            "internet": "Required for AccuWeather API (optional, simulation otherwise)"
        },
        "ideal_requirements": {
            "rust": "latest stable",
            "ram": "1GB+",
            "cpu": "Any 64-bit CPU",
            "storage": "500MB+ SSD",
            "browser": "Latest Chrome/Firefox",
            "internet": "Broadband connection for real-time data"
        },
        "dependencies": [
            "tokio 1",
            "axum 0.7",
            "reqwest 0.12",
            "serde 1",
            "csv 1.3",
            "chrono 0.4",
            "rand 0.8",
            "tracing 0.1"
        ],
        "api_requirements": {
            "accuweather_key": "Free tier: 50 calls/day",
            "signup_url": "https://developer.accuweather.com/",
            "data_file": "UTTRAKHAND_ISRO0019_2012-11-02_2019-01-02_Nov2025_175236.csv"
        },
        "setup_instructions": [
            "1. Install Rust via rustup",
            "2. Clone the repository",
            "3. Get an AccuWeather API key from developer.accuweather.com",
            "4. Create .env file: ACCUWEATHER_API_KEY=your_key_here",
            "5. Place the historical CSV data file in the working directory",
            "6. Run: cargo run --release",
            "7. Open browser to http://127.0.0.1:5000"
        ],
        "features": [
            "Real-time AccuWeather API integration with simulated fallback",
            "5-day forecast from live data or historical analogues",
            "Hourly viewing outlook",
            "Historical data analysis (2012-2019)",
            "Telescope viewing condition predictions",
            "Multi-location support (4 sites)",
            "CSV data export and storage",
            "Auto-refresh every 5 minutes"
        ]
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
