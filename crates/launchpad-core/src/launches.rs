// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Launch directory.
//!
//! Owns the flight-number sequence and upsert-by-flight-number persistence of
//! launches, and bootstraps itself from the external provider exactly once.
//!
//! # Launch lifecycle
//!
//! ```text
//!   scheduled (upcoming = true)
//!        │
//!        ├── completed   (success recorded)
//!        └── aborted     (upcoming = false, success = false)
//! ```
//!
//! Nothing leaves the aborted state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::persistence::{Launch, LaunchFilter, Persistence};
use crate::provider::LaunchProvider;

/// Flight number treated as "latest" when the directory is empty.
pub const DEFAULT_FLIGHT_NUMBER: i64 = 100;

/// Customers attached to every newly scheduled launch.
pub const DEFAULT_CUSTOMERS: [&str; 2] = ["NASA", "Yamada Family"];

/// The first SpaceX launch. Its presence means the bootstrap already ran.
pub const SENTINEL_FLIGHT_NUMBER: i64 = 1;
/// Mission of the sentinel launch.
pub const SENTINEL_MISSION: &str = "FalconSat";
/// Rocket of the sentinel launch.
pub const SENTINEL_ROCKET: &str = "Falcon 1";

/// A request to schedule a new launch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLaunch {
    /// Mission name.
    pub mission: String,
    /// Rocket name.
    pub rocket: String,
    /// Planned launch time.
    pub launch_date: DateTime<Utc>,
    /// Destination planet; must be in the planet set.
    pub target: String,
}

impl NewLaunch {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("mission", &self.mission),
            ("rocket", &self.rocket),
            ("target", &self.target),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidLaunch {
                    field,
                    message: "must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Launch directory backed by a store handle and a bulk launch provider.
#[derive(Clone)]
pub struct LaunchDirectory {
    persistence: Arc<dyn Persistence>,
    provider: Arc<dyn LaunchProvider>,
}

impl LaunchDirectory {
    /// Create a directory over the given store and provider.
    pub fn new(persistence: Arc<dyn Persistence>, provider: Arc<dyn LaunchProvider>) -> Self {
        Self {
            persistence,
            provider,
        }
    }

    fn sentinel_filter() -> LaunchFilter {
        LaunchFilter {
            flight_number: Some(SENTINEL_FLIGHT_NUMBER),
            mission: Some(SENTINEL_MISSION.to_string()),
            rocket: Some(SENTINEL_ROCKET.to_string()),
        }
    }

    /// Import every provider launch unless the sentinel launch is already stored.
    ///
    /// Returns the number of imported launches, 0 when the import was skipped.
    ///
    /// # Errors
    ///
    /// [`Error::Fetch`] if the provider answers with a non-200 status. Store
    /// errors abort the import; launches already written stay written.
    #[instrument(skip(self))]
    pub async fn bootstrap_if_empty(&self) -> Result<u64> {
        if self
            .persistence
            .find_launch(&Self::sentinel_filter())
            .await?
            .is_some()
        {
            info!("Launch data already loaded");
            return Ok(0);
        }

        let docs = self.provider.fetch_launches().await?;

        let mut imported = 0;
        for doc in docs {
            let launch = doc.into_launch();
            debug!(
                flight_number = launch.flight_number,
                mission = %launch.mission,
                "Importing launch"
            );
            self.persistence.upsert_launch(&launch).await?;
            imported += 1;
        }

        info!(imported, "Launch data loaded");
        Ok(imported)
    }

    /// Launches in ascending flight-number order, windowed by `skip` and `limit`.
    pub async fn get_launches(&self, skip: u64, limit: Option<u64>) -> Result<Vec<Launch>> {
        self.persistence.list_launches(skip, limit).await
    }

    /// Schedule a launch towards a known planet.
    ///
    /// The launch gets the next flight number, `upcoming = true`,
    /// `success = true` and the default customer list.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLaunch`] if a required field is blank
    /// - [`Error::UnknownPlanet`] if `target` is not in the planet set
    /// - [`Error::InvalidLaunch`] on `flight_number` if the latest stored
    ///   flight number is `i64::MAX`
    #[instrument(skip(self, new_launch), fields(mission = %new_launch.mission, target = %new_launch.target))]
    pub async fn schedule_launch(&self, new_launch: NewLaunch) -> Result<Launch> {
        new_launch.validate()?;

        if self
            .persistence
            .get_planet(&new_launch.target)
            .await?
            .is_none()
        {
            warn!("No matching planet was found");
            return Err(Error::UnknownPlanet {
                target: new_launch.target,
            });
        }

        let flight_number = self
            .persistence
            .latest_flight_number()
            .await?
            .unwrap_or(DEFAULT_FLIGHT_NUMBER)
            .checked_add(1)
            .ok_or_else(|| Error::InvalidLaunch {
                field: "flight_number",
                message: "sequence is exhausted".to_string(),
            })?;

        let launch = Launch {
            flight_number,
            mission: new_launch.mission,
            rocket: new_launch.rocket,
            launch_date: new_launch.launch_date,
            upcoming: true,
            success: Some(true),
            customers: DEFAULT_CUSTOMERS.iter().map(|c| c.to_string()).collect(),
            target: Some(new_launch.target),
        };
        self.persistence.upsert_launch(&launch).await?;

        info!(flight_number, "Launch scheduled");
        Ok(launch)
    }

    /// Whether a launch with this flight number exists.
    pub async fn exists_launch(&self, flight_number: i64) -> Result<bool> {
        Ok(self.persistence.get_launch(flight_number).await?.is_some())
    }

    /// Abort a launch.
    ///
    /// Returns `true` only if this call modified the record; aborting an
    /// already-aborted or unknown launch returns `false`.
    #[instrument(skip(self))]
    pub async fn abort_launch(&self, flight_number: i64) -> Result<bool> {
        let modified = self.persistence.abort_launch(flight_number).await?;
        if modified == 1 {
            info!("Launch aborted");
        } else {
            debug!(modified, "Abort changed nothing");
        }
        Ok(modified == 1)
    }

    /// Number of stored launches.
    pub async fn count_launches(&self) -> Result<i64> {
        self.persistence.count_launches().await
    }
}
