// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL-backed persistence implementation.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use crate::error::{Error, Result};

use super::{Launch, LaunchFilter, Persistence, Planet, sql_window};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/postgresql");

/// PostgreSQL-backed persistence implementation.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Create a new Postgres-backed persistence implementation.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded PostgreSQL migrations.
    ///
    /// Safe to call multiple times; already-applied migrations are skipped.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Connect to a PostgreSQL URL and run migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| Error::database("connect", e))?;

        let persistence = Self::new(pool);
        persistence.migrate().await?;
        Ok(persistence)
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Persistence for PostgresPersistence {
    async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
        let launch = sqlx::query_as::<_, Launch>(
            r#"
            SELECT flight_number, mission, rocket, launch_date, upcoming, success, customers, target
            FROM launches
            WHERE ($1::BIGINT IS NULL OR flight_number = $1)
              AND ($2::TEXT IS NULL OR mission = $2)
              AND ($3::TEXT IS NULL OR rocket = $3)
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

        // LIMIT NULL is unbounded in PostgreSQL.
        let launches = sqlx::query_as::<_, Launch>(
            r#"
            SELECT flight_number, mission, rocket, launch_date, upcoming, success, customers, target
            FROM launches
            ORDER BY flight_number ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
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
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (flight_number) DO UPDATE SET
                mission = EXCLUDED.mission,
                rocket = EXCLUDED.rocket,
                launch_date = EXCLUDED.launch_date,
                upcoming = EXCLUDED.upcoming,
                success = EXCLUDED.success,
                customers = EXCLUDED.customers,
                target = COALESCE(EXCLUDED.target, launches.target),
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
            WHERE flight_number = $1
              AND (upcoming OR success IS DISTINCT FROM FALSE)
            "#,
        )
        .bind(flight_number)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        let planet =
            sqlx::query_as::<_, Planet>("SELECT kepler_name FROM planets WHERE kepler_name = $1")
                .bind(kepler_name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(planet)
    }

    async fn upsert_planet(&self, kepler_name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO planets (kepler_name)
            VALUES ($1)
            ON CONFLICT (kepler_name) DO NOTHING
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
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
