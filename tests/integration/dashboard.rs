//! Dashboard HTTP surface over the stub provider.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use scopecast::dashboard::build_router;
use scopecast::dashboard::routes::DashboardState;
use scopecast::data::history::HistoricalDataset;
use scopecast::data::locations::LocationRegistry;
use scopecast::engine::conditions::ConditionsService;
use scopecast::storage::ObservationLog;

use crate::stub_provider::{ideal, StubProvider};

fn app(dir: &tempfile::TempDir) -> Router {
    let service = ConditionsService::new(
        Arc::new(StubProvider::live(ideal())),
        LocationRegistry::builtin(),
        HistoricalDataset::empty(),
        ObservationLog::new(dir.path().join("current_weather_data.csv")),
        5,
        "beluwakhan",
    )
    .unwrap();
    build_router(Arc::new(DashboardState::new(service)))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<(String, String)>, String) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_conditions_then_export() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, _, body) = get(&app, "/api/telescope-conditions/nainital").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["weather"]["location"], "Nainital");
    assert_eq!(json["weather"]["api_source"], "AccuWeather Live Data");
    assert_eq!(json["prediction"]["score"], 100);
    assert_eq!(json["prediction"]["recommendation"], "Excellent");
    assert_eq!(json["forecast_source"], "live");

    get(&app, "/api/telescope-conditions/mumbai").await;

    let (status, _, body) = get(&app, "/api/export-stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total_records"], 8);
    assert_eq!(stats["export_url"], "/export/weather-data");
    assert_eq!(stats["locations_covered"].as_array().unwrap().len(), 4);

    let (status, headers, body) = get(&app, "/export/weather-data").await;
    assert_eq!(status, StatusCode::OK);
    let content_type = headers
        .iter()
        .find(|(k, _)| k == header::CONTENT_TYPE.as_str())
        .map(|(_, v)| v.as_str());
    assert_eq!(content_type, Some("text/csv"));

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].ends_with("telescope_score"));
    assert!(lines[1..].iter().all(|l| l.ends_with(",100")));
}

#[tokio::test]
async fn test_location_keys_are_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (_, _, body) = get(&app, "/api/telescope-conditions/DELHI").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["weather"]["location"], "Delhi");
    assert_eq!(
        json["locations"],
        serde_json::json!(["beluwakhan", "nainital", "delhi", "mumbai"])
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, _) = get(&app(&dir), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
