use crate::model::WeatherReading;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Failures a provider fetch can produce. The service layer branches on
/// these to pick the RPC status, so the upstream HTTP status must survive
/// in `Http`, and a missing credential must stay distinct from provider
/// faults.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("OWM_API_KEY is not set in the environment variables.")]
    MissingApiKey,

    #[error("provider returned HTTP status {0}")]
    Http(u16),

    #[error("failed to parse provider payload: {0}")]
    Parse(String),

    #[error("provider transport failure: {0}")]
    Transport(String),
}

/// Fetches one live reading for a city from the external weather provider.
/// Emptiness validation of `city` happens upstream in the service, not here.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<WeatherReading, ProviderError>;
}
