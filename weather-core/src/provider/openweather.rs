use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::WeatherReading;

use super::{ProviderError, WeatherProvider};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// HTTP client for the OpenWeatherMap "current weather" endpoint.
///
/// One GET per fetch, metric units, no retry and no timeout beyond the
/// transport default; failures propagate immediately.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        // Fail fast on a missing credential so the caller can map this to
        // a configuration error instead of blaming the upstream.
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ProviderError::Http(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        parse_current(&body)
    }
}

/// Parse the provider payload into a normalized reading.
///
/// `name`, `main.temp`, `main.humidity` and `weather[0].description` are
/// required; a payload without them is a hard parse failure. `wind.speed`
/// defaults to 0.0 when absent.
pub fn parse_current(body: &str) -> Result<WeatherReading, ProviderError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| ProviderError::Parse("payload contained no weather conditions".into()))?;

    Ok(WeatherReading {
        city: parsed.name,
        temperature_c: parsed.main.temp,
        description,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.map(|w| w.speed).unwrap_or(0.0),
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}
