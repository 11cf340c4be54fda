use serde::{Deserialize, Serialize};

/// One observation as normalized from the provider payload, before it has
/// been persisted (no timestamp yet).
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub city: String,
    pub temperature_c: f64,
    pub description: String,
    pub humidity: i64,
    pub wind_speed: f64,
}

/// A persisted observation. `timestamp_ms` is assigned by the store at the
/// moment of insertion (ingest time, not the provider's observation time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature_c: f64,
    pub description: String,
    pub humidity: i64,
    pub wind_speed: f64,
    pub timestamp_ms: i64,
}

/// Normalized lookup key: trimmed and lowercased city name, so that queries
/// are case- and whitespace-insensitive.
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}
