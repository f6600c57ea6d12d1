// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Launchpad Core - Launch Directory and Habitable Planets
//!
//! This crate keeps the data behind a space-launch tracking application: a
//! directory of launches imported from the SpaceX API or scheduled by users,
//! and the set of potentially habitable planets those launches may target.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐        ┌──────────────────────────┐
//! │  SpaceX v4 API     │        │  kepler_data.csv         │
//! │  launches/query    │        │  (# comments + header)   │
//! └─────────┬──────────┘        └────────────┬─────────────┘
//!           │ one bulk POST                  │ streamed rows
//!           ▼                                ▼
//! ┌────────────────────┐        ┌──────────────────────────┐
//! │  LaunchDirectory   │──────► │  HabitablePlanetFilter   │
//! │  (this crate)      │ target │  (this crate)            │
//! └─────────┬──────────┘ lookup └────────────┬─────────────┘
//!           │                                │
//!           ▼                                ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │            Persistence (SQLite or PostgreSQL)           │
//! │     launches keyed by flight_number, planets by name    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `bootstrap_if_empty` | Import all provider launches unless the FalconSat sentinel exists |
//! | `get_launches` | Launches by ascending flight number, with skip/limit |
//! | `schedule_launch` | Validate target planet, assign next flight number, upsert |
//! | `exists_launch` | Whether a flight number is known |
//! | `abort_launch` | Mark upcoming=false, success=false; true only if modified |
//! | `load_planets` | Stream the Kepler CSV and upsert habitable planets |
//! | `get_all_planets` | All stored planets |
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `LAUNCHPAD_DATABASE_URL` | Yes | - | `sqlite:` or `postgres://` connection string |
//! | `LAUNCHPAD_LAUNCH_API_URL` | No | SpaceX v4 `launches/query` | Bulk launch endpoint |
//! | `LAUNCHPAD_PLANETS_CSV` | No | bundled `data/kepler_data.csv` | Kepler dataset path |
//! | `LAUNCHPAD_DB_MAX_CONNECTIONS` | No | `5` | Database pool size |
//!
//! # Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error type with stable error codes
//! - [`launches`]: Launch directory
//! - [`persistence`]: Storage trait with SQLite and PostgreSQL backends
//! - [`planets`]: Habitable planet filter
//! - [`provider`]: External launch data provider

#![deny(missing_docs)]

/// Configuration loaded from environment variables.
pub mod config;

/// Error types with machine-readable codes.
pub mod error;

/// Launch directory: bootstrap, scheduling, aborts.
pub mod launches;

/// Storage abstraction and backends.
pub mod persistence;

/// Habitable planet ingestion.
pub mod planets;

/// External launch data provider.
pub mod provider;

pub use error::{Error, Result};
pub use launches::{LaunchDirectory, NewLaunch};
pub use persistence::{Launch, Persistence, Planet};
pub use planets::{HabitablePlanetFilter, PlanetLoadSummary, is_habitable_planet};
pub use provider::{LaunchProvider, SpaceXProvider};
