//! Binary entrypoint for the HTTP gateway.
//!
//! A thin protocol translator: REST-style requests are mapped onto RPC
//! calls, and RPC status codes onto HTTP statuses. No business logic lives
//! here beyond defaulting the history range.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use weather_core::{GatewayConfig, RpcHttpClient};
use weather_gateway::api::{self, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_gateway=info,weather_core=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = GatewayConfig::from_env();
    let rpc = RpcHttpClient::new(&config.client);

    let state = AppState { rpc: Arc::new(rpc) };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind gateway port {}", config.port))?;
    tracing::info!(
        port = config.port,
        rpc_addr = %config.client.rpc_addr,
        "Weather gateway listening"
    );

    axum::serve(listener, api::app(state))
        .await
        .context("Gateway exited")?;

    Ok(())
}
