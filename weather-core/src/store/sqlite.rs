use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::model::{city_key, WeatherReading, WeatherSnapshot};

use super::{SnapshotStore, StoreError};

/// SQLite-backed snapshot store. The pool is shared across all concurrent
/// calls; inserts and range scans rely on SQLite's own concurrency control.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// Connect to `database_url` and ensure the snapshot table and its
    /// `(city_key, timestamp_ms)` index exist.
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(database_url).await?;
        Self::from_pool(pool, table).await
    }

    /// Build a store on an existing pool (tests use an in-memory pool).
    pub async fn from_pool(pool: SqlitePool, table: &str) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            table: table.to_string(),
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                city_key TEXT NOT NULL,
                temperature_c REAL NOT NULL,
                description TEXT NOT NULL,
                humidity INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                timestamp_ms INTEGER NOT NULL
            )",
            table = self.table
        );
        sqlx::query(&create).execute(&self.pool).await?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_city_ts
                ON {table} (city_key, timestamp_ms)",
            table = self.table
        );
        sqlx::query(&index).execute(&self.pool).await?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn save_snapshot(&self, reading: &WeatherReading) -> Result<WeatherSnapshot, StoreError> {
        let timestamp_ms = Utc::now().timestamp_millis();
        let key = city_key(&reading.city);

        let insert = format!(
            "INSERT INTO {table}
                (city, city_key, temperature_c, description, humidity, wind_speed, timestamp_ms)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            table = self.table
        );
        sqlx::query(&insert)
            .bind(&reading.city)
            .bind(&key)
            .bind(reading.temperature_c)
            .bind(&reading.description)
            .bind(reading.humidity)
            .bind(reading.wind_speed)
            .bind(timestamp_ms)
            .execute(&self.pool)
            .await?;

        Ok(WeatherSnapshot {
            city: reading.city.clone(),
            temperature_c: reading.temperature_c,
            description: reading.description.clone(),
            humidity: reading.humidity,
            wind_speed: reading.wind_speed,
            timestamp_ms,
        })
    }

    async fn fetch_series(
        &self,
        city: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<WeatherSnapshot>, StoreError> {
        let select = format!(
            "SELECT city, temperature_c, description, humidity, wind_speed, timestamp_ms
             FROM {table}
             WHERE city_key = ? AND timestamp_ms >= ? AND timestamp_ms < ?
             ORDER BY timestamp_ms ASC",
            table = self.table
        );
        let rows = sqlx::query(&select)
            .bind(city_key(city))
            .bind(from_ms)
            .bind(to_ms)
            .fetch_all(&self.pool)
            .await?;

        let series = rows
            .iter()
            .map(|row| {
                Ok(WeatherSnapshot {
                    city: row.try_get("city")?,
                    temperature_c: row.try_get("temperature_c")?,
                    description: row.try_get("description")?,
                    humidity: row.try_get("humidity")?,
                    wind_speed: row.try_get("wind_speed")?,
                    timestamp_ms: row.try_get("timestamp_ms")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        // Single connection, otherwise every pooled connection would see
        // its own private in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory sqlite");
        SqliteStore::from_pool(pool, "snapshots")
            .await
            .expect("migrate snapshot table")
    }

    fn reading(city: &str) -> WeatherReading {
        WeatherReading {
            city: city.to_string(),
            temperature_c: 10.5,
            description: "few clouds".to_string(),
            humidity: 60,
            wind_speed: 3.2,
        }
    }

    #[tokio::test]
    async fn save_then_fetch_round_trip() {
        let store = memory_store().await;

        let saved = store.save_snapshot(&reading("London")).await.expect("save");
        assert!(saved.timestamp_ms > 0);

        let t = saved.timestamp_ms;
        let series = store
            .fetch_series("London", t - 5_000, t + 5_000)
            .await
            .expect("fetch");
        assert!(series.iter().any(|s| *s == saved));
    }

    #[tokio::test]
    async fn query_is_case_and_whitespace_insensitive() {
        let store = memory_store().await;

        let saved = store
            .save_snapshot(&reading("  London  "))
            .await
            .expect("save");

        let t = saved.timestamp_ms;
        let series = store
            .fetch_series("london", t - 1_000, t + 1_000)
            .await
            .expect("fetch");
        assert_eq!(series.len(), 1);
        // The display name keeps the provider's original spelling.
        assert_eq!(series[0].city, "  London  ");
    }

    #[tokio::test]
    async fn range_is_half_open() {
        let store = memory_store().await;

        let saved = store.save_snapshot(&reading("London")).await.expect("save");
        let t = saved.timestamp_ms;

        let inclusive_start = store.fetch_series("London", t, t + 1).await.expect("fetch");
        assert_eq!(inclusive_start.len(), 1);

        let exclusive_end = store.fetch_series("London", t - 1, t).await.expect("fetch");
        assert!(exclusive_end.is_empty());
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_series() {
        let store = memory_store().await;

        let series = store
            .fetch_series("Nowhere", 1, 2)
            .await
            .expect("fetch should succeed");
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn duplicate_saves_create_new_rows() {
        let store = memory_store().await;

        let first = store.save_snapshot(&reading("London")).await.expect("save");
        let second = store.save_snapshot(&reading("London")).await.expect("save");

        let from = first.timestamp_ms.min(second.timestamp_ms);
        let to = first.timestamp_ms.max(second.timestamp_ms) + 1;
        let series = store.fetch_series("London", from, to).await.expect("fetch");
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn series_is_ordered_ascending() {
        let store = memory_store().await;

        for _ in 0..3 {
            store.save_snapshot(&reading("London")).await.expect("save");
        }

        let series = store
            .fetch_series("London", 1, i64::MAX)
            .await
            .expect("fetch");
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    }
}
