use std::env;

/// Configuration for the RPC server process, read once at startup and
/// passed into each component. All values are environment-sourced; `.env`
/// loading (dotenvy) is the binary's job, not this module's.
///
/// Variables and defaults:
/// - `OWM_API_KEY`     (default `""`, provider calls fail fast when empty)
/// - `SERVICE_API_KEY` (default `""`)
/// - `RPC_PORT`        (default `50051`)
/// - `DATABASE_URL`    (default `sqlite://weather.sqlite?mode=rwc`)
/// - `SNAPSHOT_TABLE`  (default `snapshots`)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub owm_api_key: String,
    pub service_api_key: String,
    pub rpc_port: u16,
    pub database_url: String,
    pub snapshot_table: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            owm_api_key: lookup("OWM_API_KEY").unwrap_or_default(),
            service_api_key: lookup("SERVICE_API_KEY").unwrap_or_default(),
            rpc_port: parse_port(lookup("RPC_PORT"), 50051),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://weather.sqlite?mode=rwc".to_string()),
            snapshot_table: lookup("SNAPSHOT_TABLE").unwrap_or_else(|| "snapshots".to_string()),
        }
    }
}

/// Configuration for processes that call the RPC service (gateway, CLI).
///
/// Variables and defaults:
/// - `RPC_ADDR`        (default `http://localhost:50051`)
/// - `SERVICE_API_KEY` (default `dev-secret`)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_addr: String,
    pub service_api_key: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            rpc_addr: lookup("RPC_ADDR")
                .unwrap_or_else(|| "http://localhost:50051".to_string()),
            service_api_key: lookup("SERVICE_API_KEY")
                .unwrap_or_else(|| "dev-secret".to_string()),
        }
    }
}

/// Configuration for the HTTP gateway process.
///
/// `GATEWAY_PORT` (default `8000`) plus the [`ClientConfig`] variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub client: ClientConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var("GATEWAY_PORT").ok(), 8000),
            client: ClientConfig::from_env(),
        }
    }
}

fn parse_port(raw: Option<String>, default: u16) -> u16 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}
