// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for launchpad-core.
//!
//! Provides a unified error type with stable machine-readable codes.

use thiserror::Error;

/// Result type using launchpad [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the launch directory, planet filter and their backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The launch provider answered with a non-200 status.
    #[error("Launch data download failed with status {status}")]
    Fetch {
        /// HTTP status returned by the provider.
        status: u16,
    },

    /// The request to the launch provider could not be sent or decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A scheduled launch targets a planet that is not in the planet set.
    #[error("No matching planet was found for target '{target}'")]
    UnknownPlanet {
        /// The requested target planet name.
        target: String,
    },

    /// A new launch request failed validation.
    #[error("Invalid launch: {field} {message}")]
    InvalidLaunch {
        /// The offending field.
        field: &'static str,
        /// The validation error message.
        message: String,
    },

    /// The planet dataset could not be read.
    #[error("Failed to load planet data: {0}")]
    DataLoad(String),

    /// Database operation failed.
    #[error("Database error during '{operation}': {details}")]
    Database {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "FETCH_FAILED",
            Self::Http(_) => "HTTP_ERROR",
            Self::UnknownPlanet { .. } => "UNKNOWN_PLANET",
            Self::InvalidLaunch { .. } => "INVALID_LAUNCH",
            Self::DataLoad(_) => "DATA_LOAD_FAILED",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    pub(crate) fn database(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Database {
            operation: operation.to_string(),
            details: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::database("query", err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::database("migrate", err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::DataLoad(err.to_string())
    }
}
