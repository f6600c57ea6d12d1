// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SQLite-backed persistence implementation.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;

use crate::error::{Error, Result};

use super::{Launch, LaunchFilter, Persistence, Planet, sql_window};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");

/// SQLite-backed persistence provider.
#[derive(Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Create a new SQLite persistence provider from an existing pool.
    ///
    /// The pool is used as-is; call [`SqlitePersistence::migrate`] if the
    /// schema may be missing.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the embedded SQLite migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Connect to a `sqlite:` URL, creating the database file if missing,
    /// and run migrations.
    ///
    /// In-memory databases are limited to a single connection, since every
    /// SQLite connection to `:memory:` opens its own empty database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::database("connect", e))?
            .create_if_missing(true);

        let max_connections = if url.contains(":memory:") {
            1
        } else {
            max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::database("connect", format!("{}: {}", url, e)))?;

        let persistence = Self::new(pool);
        persistence.migrate().await?;
        Ok(persistence)
    }

    /// Create and initialize a new SQLite persistence from a file path.
    ///
    /// Creates parent directories if they don't exist.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::database(
                    "create_dir",
                    format!("Failed to create directory {:?}: {}", parent, e),
                )
            })?;
        }

        let url = format!("sqlite:{}", path.to_string_lossy());
        Self::connect(&url, 5).await
    }
}

#[async_trait::async_trait]
impl Persistence for SqlitePersistence {
    async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
        let launch = sqlx::query_as::<_, Launch>(
            r#"
            SELECT flight_number, mission, rocket, launch_date, upcoming, success, customers, target
            FROM launches
            WHERE (?1 IS NULL OR flight_number = ?1)
              AND (?2 IS NULL OR mission = ?2)
              AND (?3 IS NULL OR rocket = ?3)
            ORDER BY flight_number
            LIMIT 1
            "#,
        )
        .bind(filter.flight_number)
        .bind(filter.mission.as_deref())
        .bind(filter.rocket.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(launch)
    }

    async fn latest_flight_number(&self) -> Result<Option<i64>> {
        let latest = sqlx::query_scalar::<_, i64>(
            "SELECT flight_number FROM launches ORDER BY flight_number DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(latest)
    }

    async fn list_launches(&self, skip: u64, limit: Option<u64>) -> Result<Vec<Launch>> {
        let (offset, limit) = sql_window(skip, limit);

        // SQLite treats a negative LIMIT as unbounded.
        let launches = sqlx::query_as::<_, Launch>(
            r#"
            SELECT flight_number, mission, rocket, launch_date, upcoming, success, customers, target
            FROM launches
            ORDER BY flight_number ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit.unwrap_or(-1))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(launches)
    }

    async fn count_launches(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM launches")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn upsert_launch(&self, launch: &Launch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO launches
                (flight_number, mission, rocket, launch_date, upcoming, success, customers, target)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(flight_number) DO UPDATE SET
                mission = excluded.mission,
                rocket = excluded.rocket,
                launch_date = excluded.launch_date,
                upcoming = excluded.upcoming,
                success = excluded.success,
                customers = excluded.customers,
                target = COALESCE(excluded.target, launches.target),
                version = launches.version + 1
            "#,
        )
        .bind(launch.flight_number)
        .bind(&launch.mission)
        .bind(&launch.rocket)
        .bind(launch.launch_date)
        .bind(launch.upcoming)
        .bind(launch.success)
        .bind(Json(&launch.customers))
        .bind(launch.target.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn abort_launch(&self, flight_number: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE launches
            SET upcoming = FALSE, success = FALSE, version = version + 1
            WHERE flight_number = ?
              AND (upcoming <> FALSE OR success IS NULL OR success <> FALSE)
            "#,
        )
        .bind(flight_number)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        let planet =
            sqlx::query_as::<_, Planet>("SELECT kepler_name FROM planets WHERE kepler_name = ?")
                .bind(kepler_name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(planet)
    }

    async fn upsert_planet(&self, kepler_name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO planets (kepler_name)
            VALUES (?)
            ON CONFLICT(kepler_name) DO NOTHING
            "#,
        )
        .bind(kepler_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_planets(&self) -> Result<Vec<Planet>> {
        let planets =
            sqlx::query_as::<_, Planet>("SELECT kepler_name FROM planets ORDER BY kepler_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(planets)
    }

    async fn count_planets(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM planets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
