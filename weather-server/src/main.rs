//! Binary entrypoint for the weather RPC service.
//!
//! Wires configuration, the OpenWeatherMap provider, the SQLite snapshot
//! store and the service logic into an axum app with the auth gate in
//! front of every RPC route.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use weather_core::{OpenWeatherClient, ServerConfig, SqliteStore, WeatherService};

use weather_server::api::{self, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_server=info,weather_core=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServerConfig::from_env();

    let store = SqliteStore::connect(&config.database_url, &config.snapshot_table)
        .await
        .with_context(|| format!("Failed to open snapshot store at {}", config.database_url))?;
    let provider = OpenWeatherClient::new(config.owm_api_key.clone());
    let service = WeatherService::new(Arc::new(provider), Arc::new(store));

    let state = AppState {
        service: Arc::new(service),
        service_api_key: Arc::new(config.service_api_key.clone()),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.rpc_port))
        .await
        .with_context(|| format!("Failed to bind RPC port {}", config.rpc_port))?;
    tracing::info!(port = config.rpc_port, "WeatherService listening");

    axum::serve(listener, api::app(state))
        .await
        .context("RPC server exited")?;

    Ok(())
}
