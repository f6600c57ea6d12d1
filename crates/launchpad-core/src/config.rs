// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::path::PathBuf;

/// Default bulk query endpoint of the SpaceX v4 API.
pub const DEFAULT_LAUNCH_API_URL: &str = "https://api.spacexdata.com/v4/launches/query";

/// Default location of the Kepler objects-of-interest dataset: the copy
/// bundled with this crate, independent of the working directory.
pub const DEFAULT_PLANETS_CSV: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/kepler_data.csv");

/// Launchpad configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL or SQLite connection URL
    pub database_url: String,
    /// Bulk launch query endpoint
    pub launch_api_url: String,
    /// Path to the Kepler CSV dataset
    pub planets_csv: PathBuf,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `LAUNCHPAD_DATABASE_URL`: PostgreSQL or SQLite connection string
    ///
    /// Optional (with defaults):
    /// - `LAUNCHPAD_LAUNCH_API_URL`: launch provider query URL (default: SpaceX v4)
    /// - `LAUNCHPAD_PLANETS_CSV`: Kepler dataset path (default: bundled data/kepler_data.csv)
    /// - `LAUNCHPAD_DB_MAX_CONNECTIONS`: pool size (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("LAUNCHPAD_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("LAUNCHPAD_DATABASE_URL"))?;

        let launch_api_url = std::env::var("LAUNCHPAD_LAUNCH_API_URL")
            .unwrap_or_else(|_| DEFAULT_LAUNCH_API_URL.to_string());
        if !launch_api_url.starts_with("http://") && !launch_api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "LAUNCHPAD_LAUNCH_API_URL",
                "must be an http(s) URL",
            ));
        }

        let planets_csv = std::env::var("LAUNCHPAD_PLANETS_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PLANETS_CSV));

        let db_max_connections: u32 = std::env::var("LAUNCHPAD_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid(
                "LAUNCHPAD_DB_MAX_CONNECTIONS",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_url,
            launch_api_url,
            planets_csv,
            db_max_connections,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
