// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Launchpad - startup data sync
//!
//! Connects to the store, loads habitable planets from the Kepler dataset and
//! bootstraps the launch directory from the SpaceX API if it is still empty.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use launchpad_core::config::Config;
use launchpad_core::persistence;
use launchpad_core::{HabitablePlanetFilter, LaunchDirectory, SpaceXProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launchpad_core=info,launchpad=info".into()),
        )
        .init();

    info!("Starting Launchpad");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        launch_api_url = %config.launch_api_url,
        planets_csv = %config.planets_csv.display(),
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let store = persistence::connect(&config.database_url, config.db_max_connections).await?;
    let healthy = store.health_check().await?;
    info!(healthy, "Database connection established");

    let planets = HabitablePlanetFilter::new(store.clone());
    let summary = planets.load_planets(&config.planets_csv).await?;

    let provider = Arc::new(SpaceXProvider::new(config.launch_api_url.clone()));
    let launches = LaunchDirectory::new(store.clone(), provider);
    let imported = launches.bootstrap_if_empty().await?;

    info!(
        planets = summary.total_planets,
        launches = launches.count_launches().await?,
        imported,
        "Launch data synchronized"
    );

    Ok(())
}
