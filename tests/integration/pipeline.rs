//! Conditions pipeline against a historical CSV on disk.

use chrono::{DateTime, FixedOffset, TimeZone};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::sync::Arc;

use scopecast::data::history::HistoricalDataset;
use scopecast::data::locations::LocationRegistry;
use scopecast::engine::conditions::{ConditionsService, ForecastSource};
use scopecast::storage::ObservationLog;
use scopecast::types::{DataSource, Recommendation};

use crate::stub_provider::{ideal, StubProvider};

const HISTORY_CSV: &str = "\
DATE(IST),AIR_TEMP(°C),HUMIDITY(%),WIND_SPEED(m/s),ATMO_PRESSURE(hpa)
10-16-2013,11.2,48,1.1,968.4
10-16-2014,13.0,52,0.9,967.1
10/20/2015,14.5,60,2.2,966.0
2016-10-25,9.8,75,3.4,965.2
11-02-2012,8.1,40,1.0,970.3
not-a-date,10.0,50,1.0,960.0
10-05-2017,,55,1.2,969.9
";

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(19800)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 16, 21, 30, 0)
        .unwrap()
}

fn history(dir: &tempfile::TempDir) -> HistoricalDataset {
    let path = dir.path().join("history.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(HISTORY_CSV.as_bytes()).unwrap();
    let (dataset, stats) = HistoricalDataset::load(&path).unwrap();
    assert_eq!(stats.total_rows, 7);
    assert_eq!(stats.bad_dates, 1);
    dataset
}

fn service(provider: Arc<StubProvider>, dir: &tempfile::TempDir) -> ConditionsService {
    ConditionsService::new(
        provider,
        LocationRegistry::builtin(),
        history(dir),
        ObservationLog::new(dir.path().join("current_weather_data.csv")),
        5,
        "beluwakhan",
    )
    .unwrap()
}

#[tokio::test]
async fn test_outage_falls_back_to_history_and_simulation() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(StubProvider::down());
    let svc = service(provider.clone(), &dir);
    let mut rng = StdRng::seed_from_u64(11);

    let report = svc.conditions_report(Some("nainital"), now(), &mut rng).await;

    assert_eq!(report.weather.source, DataSource::Simulated);
    assert_eq!(report.weather.location_name, "Nainital");
    assert_eq!(report.forecast_source, ForecastSource::HistoricalAnalogue);
    assert_eq!(report.forecast.len(), 5);
    for (i, day) in report.forecast.iter().enumerate() {
        assert_eq!(day.date, now().date_naive() + chrono::Duration::days(i as i64 + 1));
        assert!(day.min_temp < day.max_temp);
        assert!((20.0..=95.0).contains(&day.humidity));
        assert!(day.wind_speed >= 0.0);
    }
    assert!(report.hourly_today.is_empty());

    // Six dated rows; two of them are October 16th
    assert_eq!(report.past_data.total_records, 6);
    assert_eq!(report.historical_records.len(), 2);
    assert!(report
        .historical_records
        .iter()
        .all(|r| r.date.format("%m-%d").to_string() == "10-16"));

    // One snapshot per location, requested one included
    assert_eq!(provider.current_calls(), 4);
    assert_eq!(report.saved_weather_data.len(), 4);
}

#[tokio::test]
async fn test_live_provider_scores_everything() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(StubProvider::live(ideal()));
    let svc = service(provider.clone(), &dir);
    let mut rng = StdRng::seed_from_u64(12);

    let report = svc.conditions_report(None, now(), &mut rng).await;

    assert!(report.weather.source.is_live());
    assert_eq!(report.weather.location_name, "Beluwakhan");
    assert_eq!(report.prediction.score, 100);
    assert_eq!(report.prediction.recommendation, Recommendation::Excellent);
    assert_eq!(report.prediction.factors.len(), 4);
    assert!(report.prediction.factors.iter().all(|f| f.starts_with('✓')));

    assert_eq!(report.forecast_source, ForecastSource::Live);
    assert!(report.forecast_predictions.iter().all(|p| p.score == 100));
    assert_eq!(report.hourly_today.len(), 8);
    assert_eq!(report.hourly_predictions.len(), 8);
    assert_eq!(report.hourly_predictions[0].time, "18:00");
}

#[tokio::test]
async fn test_log_accumulates_and_recovers_from_outage() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(StubProvider::live(ideal()));
    let svc = service(provider.clone(), &dir);
    let mut rng = StdRng::seed_from_u64(13);

    let first = svc.conditions_report(Some("delhi"), now(), &mut rng).await;
    assert!(first.weather.source.is_live());

    provider.set_status(500);
    let second = svc.conditions_report(Some("delhi"), now(), &mut rng).await;
    assert_eq!(second.weather.source, DataSource::Simulated);
    assert_eq!(second.forecast_source, ForecastSource::HistoricalAnalogue);

    assert_eq!(second.saved_weather_data.len(), 8);
    let logged = svc.log().read_all().unwrap().unwrap();
    assert_eq!(logged.len(), 8);
    assert_eq!(logged[0].location, "Beluwakhan");
    assert_eq!(logged[2].location, "Delhi");
    assert_eq!(logged[2].temperature, ideal().temperature);
}

#[tokio::test]
async fn test_saved_data_is_capped_at_twenty_rows() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(StubProvider::live(ideal())), &dir);
    let mut rng = StdRng::seed_from_u64(14);

    let mut last = None;
    for _ in 0..6 {
        last = Some(svc.conditions_report(Some("mumbai"), now(), &mut rng).await);
    }
    let report = last.unwrap();
    assert_eq!(svc.log().read_all().unwrap().unwrap().len(), 24);
    assert_eq!(report.saved_weather_data.len(), 20);
}
