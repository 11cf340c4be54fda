use std::sync::Arc;

use tracing::warn;

use crate::model::WeatherSnapshot;
use crate::provider::{ProviderError, WeatherProvider};
use crate::status::Status;
use crate::store::SnapshotStore;

/// The weather RPC service. Orchestrates the provider and the store and
/// owns all validation and error-mapping policy. Holds only immutable
/// references to its collaborators; every call is independent and no
/// result is cached.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn SnapshotStore>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { provider, store }
    }

    /// Fetch a live reading, persist it, and return the persisted snapshot.
    pub async fn get_current_weather(&self, city: &str) -> Result<WeatherSnapshot, Status> {
        let city = city.trim();
        if city.is_empty() {
            return Err(Status::invalid_argument("City name is required."));
        }

        let reading = self.provider.fetch_current(city).await.map_err(|err| {
            let status = map_provider_error(err);
            warn!(city, %status, "provider fetch failed");
            status
        })?;

        let snapshot = self
            .store
            .save_snapshot(&reading)
            .await
            .map_err(|err| Status::internal(err.to_string()))?;

        Ok(snapshot)
    }

    /// Persisted snapshots for `city` in the half-open range
    /// `[from_ms, to_ms)`, ascending by timestamp. An empty series is a
    /// valid, successful response.
    pub async fn get_weather_history(
        &self,
        city: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<WeatherSnapshot>, Status> {
        let city = city.trim();
        if city.is_empty() {
            return Err(Status::invalid_argument("City name is required."));
        }
        if from_ms <= 0 || to_ms <= 0 || from_ms >= to_ms {
            return Err(Status::invalid_argument("Invalid time range!"));
        }

        self.store
            .fetch_series(city, from_ms, to_ms)
            .await
            .map_err(|err| Status::internal(err.to_string()))
    }
}

/// Classify a provider failure once; the raw error never escapes to the
/// caller. All non-404/401 upstream statuses map to UNAVAILABLE, including
/// other 4xx codes, matching the long-standing behavior of this service.
fn map_provider_error(err: ProviderError) -> Status {
    match err {
        ProviderError::MissingApiKey => Status::failed_precondition(err.to_string()),
        ProviderError::Http(404) => Status::not_found("City not found"),
        ProviderError::Http(401) => Status::failed_precondition("Bad/empty OWM_API_KEY"),
        ProviderError::Http(code) => Status::unavailable(format!("Upstream error {code}")),
        other => Status::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherReading;
    use crate::status::Code;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeProvider {
        calls: AtomicUsize,
        fail_with: Option<fn() -> ProviderError>,
    }

    impl FakeProvider {
        fn failing(fail_with: fn() -> ProviderError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(fail_with),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_current(&self, city: &str) -> Result<WeatherReading, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(WeatherReading {
                city: city.to_string(),
                temperature_c: 12.3,
                description: "few clouds".to_string(),
                humidity: 60,
                wind_speed: 4.2,
            })
        }
    }

    #[derive(Debug, Default)]
    struct FakeStore {
        saves: AtomicUsize,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotStore for FakeStore {
        async fn save_snapshot(
            &self,
            reading: &WeatherReading,
        ) -> Result<WeatherSnapshot, StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherSnapshot {
                city: reading.city.clone(),
                temperature_c: reading.temperature_c,
                description: reading.description.clone(),
                humidity: reading.humidity,
                wind_speed: reading.wind_speed,
                timestamp_ms: 1_234_567_890_000,
            })
        }

        async fn fetch_series(
            &self,
            city: &str,
            from_ms: i64,
            to_ms: i64,
        ) -> Result<Vec<WeatherSnapshot>, StoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                WeatherSnapshot {
                    city: city.to_string(),
                    temperature_c: 10.0,
                    description: "ok".to_string(),
                    humidity: 50,
                    wind_speed: 3.1,
                    timestamp_ms: from_ms + 1,
                },
                WeatherSnapshot {
                    city: city.to_string(),
                    temperature_c: 11.0,
                    description: "ok".to_string(),
                    humidity: 51,
                    wind_speed: 3.0,
                    timestamp_ms: to_ms - 1,
                },
            ])
        }
    }

    fn service(provider: FakeProvider, store: FakeStore) -> (WeatherService, Arc<FakeProvider>, Arc<FakeStore>) {
        let provider = Arc::new(provider);
        let store = Arc::new(store);
        (
            WeatherService::new(provider.clone(), store.clone()),
            provider,
            store,
        )
    }

    #[tokio::test]
    async fn current_builds_snapshot_from_provider_reading() {
        let (svc, _, store) = service(FakeProvider::default(), FakeStore::default());

        let snap = svc.get_current_weather("London").await.expect("current");
        assert_eq!(snap.city, "London");
        assert_eq!(snap.temperature_c, 12.3);
        assert_eq!(snap.humidity, 60);
        assert!(snap.timestamp_ms > 0);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn current_rejects_blank_city_before_any_call() {
        let (svc, provider, store) = service(FakeProvider::default(), FakeStore::default());

        let err = svc.get_current_weather("   ").await.unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
        assert!(err.message.contains("City name is required"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn current_http_404_maps_to_not_found() {
        let (svc, _, store) = service(
            FakeProvider::failing(|| ProviderError::Http(404)),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::NotFound);
        assert!(err.message.contains("City not found"));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn current_http_401_maps_to_failed_precondition() {
        let (svc, _, _) = service(
            FakeProvider::failing(|| ProviderError::Http(401)),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::FailedPrecondition);
        assert!(err.message.contains("OWM_API_KEY"));
    }

    #[tokio::test]
    async fn current_http_500_maps_to_unavailable() {
        let (svc, _, _) = service(
            FakeProvider::failing(|| ProviderError::Http(500)),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::Unavailable);
        assert!(err.message.contains("Upstream error 500"));
    }

    #[tokio::test]
    async fn current_other_4xx_also_maps_to_unavailable() {
        let (svc, _, _) = service(
            FakeProvider::failing(|| ProviderError::Http(429)),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::Unavailable);
        assert!(err.message.contains("Upstream error 429"));
    }

    #[tokio::test]
    async fn current_missing_key_maps_to_failed_precondition() {
        let (svc, _, _) = service(
            FakeProvider::failing(|| ProviderError::MissingApiKey),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::FailedPrecondition);
        assert!(err.message.contains("OWM_API_KEY"));
    }

    #[tokio::test]
    async fn current_unexpected_failure_maps_to_internal_with_message() {
        let (svc, _, _) = service(
            FakeProvider::failing(|| ProviderError::Parse("boom".to_string())),
            FakeStore::default(),
        );

        let err = svc.get_current_weather("X").await.unwrap_err();
        assert_eq!(err.code, Code::Internal);
        assert!(err.message.contains("boom"));
    }

    #[tokio::test]
    async fn history_maps_series_through() {
        let (svc, _, _) = service(FakeProvider::default(), FakeStore::default());

        let series = svc
            .get_weather_history("Paris", 1_000, 2_000)
            .await
            .expect("history");
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|s| s.city == "Paris"));
    }

    #[tokio::test]
    async fn history_rejects_blank_city_before_store_call() {
        let (svc, _, store) = service(FakeProvider::default(), FakeStore::default());

        let err = svc.get_weather_history("  ", 1, 2).await.unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
        assert!(err.message.contains("City name is required"));
        assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_rejects_malformed_ranges() {
        let (svc, _, store) = service(FakeProvider::default(), FakeStore::default());

        for (from_ms, to_ms) in [(2_000, 1_000), (1_000, 1_000), (0, 1_000), (1_000, 0), (-5, 10)] {
            let err = svc.get_weather_history("X", from_ms, to_ms).await.unwrap_err();
            assert_eq!(err.code, Code::InvalidArgument, "range ({from_ms}, {to_ms})");
            assert!(err.message.contains("Invalid time range"));
        }
        assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
    }
}
