//! Core library for the weather RPC service.
//!
//! This crate defines:
//! - Configuration structs for the server, gateway and client processes
//! - The shared domain model (readings, persisted snapshots)
//! - The RPC status taxonomy and its HTTP mapping
//! - The OpenWeatherMap provider client
//! - The SQLite-backed snapshot store
//! - The service logic itself (validation + error-mapping policy)
//! - The RPC wire types and the HTTP RPC client
//!
//! It is used by `weather-server`, `weather-gateway` and `weather-cli`.

pub mod config;
pub mod model;
pub mod provider;
pub mod rpc;
pub mod service;
pub mod status;
pub mod store;

pub use config::{ClientConfig, GatewayConfig, ServerConfig};
pub use model::{WeatherReading, WeatherSnapshot, city_key};
pub use provider::{OpenWeatherClient, ProviderError, WeatherProvider};
pub use rpc::{RpcHttpClient, WeatherRpc, API_KEY_HEADER};
pub use service::WeatherService;
pub use status::{Code, Status};
pub use store::{SnapshotStore, SqliteStore, StoreError};
