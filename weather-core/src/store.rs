use crate::model::{WeatherReading, WeatherSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Owns the persisted snapshot records. Implementations must be safe to
/// share read-write across concurrent calls; no locks are taken above this
/// trait.
#[async_trait]
pub trait SnapshotStore: Send + Sync + Debug {
    /// Stamp `timestamp_ms = now()`, derive the city key, insert one new
    /// record and return it. Duplicates are never rejected; every call
    /// creates a new row.
    async fn save_snapshot(&self, reading: &WeatherReading) -> Result<WeatherSnapshot, StoreError>;

    /// Records for the normalized city with `timestamp_ms` in the half-open
    /// range `[from_ms, to_ms)`, ascending by timestamp. No matches is an
    /// empty vec, not an error.
    async fn fetch_series(
        &self,
        city: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<WeatherSnapshot>, StoreError>;
}
