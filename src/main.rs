//! SCOPECAST — Telescope viewing conditions service
//!
//! Entry point. Loads configuration, initialises structured logging,
//! reads the historical dataset, wires the AccuWeather client into the
//! conditions service and serves the dashboard until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use scopecast::config::AppConfig;
use scopecast::dashboard::{self, routes::DashboardState};
use scopecast::data::accuweather::AccuWeatherClient;
use scopecast::data::history::HistoricalDataset;
use scopecast::data::locations::LocationRegistry;
use scopecast::engine::conditions::ConditionsService;
use scopecast::storage::ObservationLog;

const BANNER: &str = r#"
 ____   ____ ___  ____  _____ ____    _    ____ _____
/ ___| / ___/ _ \|  _ \| ____/ ___|  / \  / ___|_   _|
\___ \| |  | | | | |_) |  _|| |     / _ \ \___ \ | |
 ___) | |__| |_| |  __/| |__| |___ / ___ \ ___) || |
|____/ \____\___/|_|   |_____\____/_/   \_\____/ |_|

  Telescope viewing conditions
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = AppConfig::load_or_default("config.toml")?;

    println!("{BANNER}");
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        default_location = %cfg.forecast.default_location,
        forecast_days = cfg.forecast.days,
        "SCOPECAST starting up"
    );

    // -- Initialise components -------------------------------------------

    let dataset = HistoricalDataset::load_or_empty(&cfg.data.historical_csv);

    let client = AccuWeatherClient::new(&cfg.provider, cfg.provider_api_key())?;
    if !client.has_api_key() {
        warn!(
            env = %cfg.provider.api_key_env,
            "No AccuWeather API key configured, serving simulated conditions"
        );
    }

    let service = ConditionsService::new(
        Arc::new(client),
        LocationRegistry::builtin(),
        dataset,
        ObservationLog::new(&cfg.data.observation_log),
        cfg.forecast.days,
        &cfg.forecast.default_location,
    )?;
    let state = Arc::new(DashboardState::new(service));

    // -- Serve -----------------------------------------------------------

    info!("Press Ctrl+C to stop.");
    dashboard::serve(state, &cfg.server.host, cfg.server.port, shutdown_signal()).await?;

    info!("SCOPECAST shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scopecast=info,tower_http=info"));

    let json_logging = std::env::var("SCOPECAST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
