// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for launchpad-core.
//!
//! Launches are keyed by flight number and planets by Kepler name; both are
//! written with upsert semantics. Every table also carries a surrogate `id`
//! and an update `version` counter, which no read ever returns.

pub mod postgres;
pub mod sqlite;

pub use self::postgres::PostgresPersistence;
pub use self::sqlite::SqlitePersistence;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A launch as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Launch {
    /// Unique, monotonically assigned flight number.
    pub flight_number: i64,
    /// Mission name.
    pub mission: String,
    /// Rocket name.
    pub rocket: String,
    /// Scheduled (or historical) launch time.
    pub launch_date: DateTime<Utc>,
    /// Whether the launch has not happened yet.
    pub upcoming: bool,
    /// Outcome; `None` while unknown.
    pub success: Option<bool>,
    /// Payload customers.
    #[sqlx(json)]
    pub customers: Vec<String>,
    /// Destination planet (Kepler name), if any.
    pub target: Option<String>,
}

/// A habitable planet as stored in the planet set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Kepler catalogue name, e.g. `Kepler-442 b`.
    pub kepler_name: String,
}

/// Equality filter for launch lookups. `None` fields match anything.
#[derive(Debug, Clone, Default)]
pub struct LaunchFilter {
    /// Match on flight number.
    pub flight_number: Option<i64>,
    /// Match on mission name.
    pub mission: Option<String>,
    /// Match on rocket name.
    pub rocket: Option<String>,
}

impl LaunchFilter {
    /// Filter matching a single flight number.
    pub fn flight_number(flight_number: i64) -> Self {
        Self {
            flight_number: Some(flight_number),
            ..Default::default()
        }
    }
}

/// Persistence interface used by the launch directory and the planet filter.
#[allow(missing_docs)]
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>>;

    async fn get_launch(&self, flight_number: i64) -> Result<Option<Launch>> {
        self.find_launch(&LaunchFilter::flight_number(flight_number))
            .await
    }

    /// Highest stored flight number, `None` when the directory is empty.
    async fn latest_flight_number(&self) -> Result<Option<i64>>;

    /// Launches ordered by ascending flight number. `limit = None` means unbounded.
    async fn list_launches(&self, skip: u64, limit: Option<u64>) -> Result<Vec<Launch>>;

    async fn count_launches(&self) -> Result<i64>;

    /// Insert or update by flight number.
    ///
    /// On update an incoming `target` of `None` keeps the stored target.
    async fn upsert_launch(&self, launch: &Launch) -> Result<()>;

    /// Mark a launch as aborted. Returns the number of modified records, which
    /// is 0 when the launch is unknown or already aborted.
    async fn abort_launch(&self, flight_number: i64) -> Result<u64>;

    async fn get_planet(&self, kepler_name: &str) -> Result<Option<Planet>>;

    /// Insert a planet if absent. Returns whether a new record was created.
    async fn upsert_planet(&self, kepler_name: &str) -> Result<bool>;

    /// All planets ordered by name.
    async fn list_planets(&self) -> Result<Vec<Planet>>;

    async fn count_planets(&self) -> Result<i64>;

    /// Cheap connectivity probe.
    async fn health_check(&self) -> Result<bool>;
}

/// Connect to the store named by `database_url` and apply migrations.
///
/// `postgres://` and `postgresql://` URLs select [`PostgresPersistence`];
/// `sqlite:` URLs select [`SqlitePersistence`].
pub async fn connect(database_url: &str, max_connections: u32) -> Result<Arc<dyn Persistence>> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        let persistence = PostgresPersistence::connect(database_url, max_connections).await?;
        Ok(Arc::new(persistence))
    } else if database_url.starts_with("sqlite:") {
        let persistence = SqlitePersistence::connect(database_url, max_connections).await?;
        Ok(Arc::new(persistence))
    } else {
        Err(Error::database(
            "connect",
            format!("unsupported database URL scheme: {}", database_url),
        ))
    }
}

/// Convert a pagination window to a signed SQL limit.
pub(crate) fn sql_window(skip: u64, limit: Option<u64>) -> (i64, Option<i64>) {
    let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
    (clamp(skip), limit.map(clamp))
}
