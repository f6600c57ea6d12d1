// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! External launch data provider.
//!
//! The directory bootstraps itself from the SpaceX v4 `launches/query`
//! endpoint. One POST returns every launch with the rocket name and payload
//! customers populated:
//!
//! ```json
//! {
//!   "query": {},
//!   "options": {
//!     "pagination": false,
//!     "populate": [
//!       { "path": "rocket", "select": { "name": 1 } },
//!       { "path": "payloads", "select": { "customers": 1 } }
//!     ]
//!   }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

use crate::error::{Error, Result};
use crate::persistence::Launch;

/// A launch document as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderLaunch {
    /// Provider flight number, reused as the directory key.
    pub flight_number: i64,
    /// Mission name.
    pub name: String,
    /// Populated rocket.
    pub rocket: ProviderRocket,
    /// Launch time in the launch site's local offset.
    pub date_local: DateTime<FixedOffset>,
    /// Whether the launch is still upcoming.
    pub upcoming: bool,
    /// Outcome, `null` for upcoming launches.
    pub success: Option<bool>,
    /// Populated payloads.
    #[serde(default)]
    pub payloads: Vec<ProviderPayload>,
}

/// Populated rocket reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRocket {
    /// Rocket name, e.g. `Falcon 9`.
    pub name: String,
}

/// Populated payload reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPayload {
    /// Customers of this payload.
    #[serde(default)]
    pub customers: Vec<String>,
}

impl ProviderLaunch {
    /// Map the provider shape onto a directory [`Launch`].
    ///
    /// Customers of all payloads are flattened in payload order.
    pub fn into_launch(self) -> Launch {
        Launch {
            flight_number: self.flight_number,
            mission: self.name,
            rocket: self.rocket.name,
            launch_date: self.date_local.with_timezone(&Utc),
            upcoming: self.upcoming,
            success: self.success,
            customers: self
                .payloads
                .into_iter()
                .flat_map(|payload| payload.customers)
                .collect(),
            target: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    docs: Vec<ProviderLaunch>,
}

/// Source of bulk launch data.
#[async_trait]
pub trait LaunchProvider: Send + Sync {
    /// Fetch every launch the provider knows about in a single call.
    async fn fetch_launches(&self) -> Result<Vec<ProviderLaunch>>;
}

/// HTTP client for the SpaceX launch query API.
#[derive(Debug, Clone)]
pub struct SpaceXProvider {
    client: reqwest::Client,
    query_url: String,
}

impl SpaceXProvider {
    /// Create a provider posting to `query_url`.
    pub fn new(query_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), query_url)
    }

    /// Create a provider reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, query_url: impl Into<String>) -> Self {
        Self {
            client,
            query_url: query_url.into(),
        }
    }

    /// The endpoint this provider posts to.
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Request body selecting all launches with populated rocket and payloads.
    pub fn query_body() -> Value {
        json!({
            "query": {},
            "options": {
                "pagination": false,
                "populate": [
                    { "path": "rocket", "select": { "name": 1 } },
                    { "path": "payloads", "select": { "customers": 1 } }
                ]
            }
        })
    }
}

#[async_trait]
impl LaunchProvider for SpaceXProvider {
    #[instrument(skip(self), fields(url = %self.query_url))]
    async fn fetch_launches(&self) -> Result<Vec<ProviderLaunch>> {
        info!("Downloading launch data");

        let response = self
            .client
            .post(&self.query_url)
            .json(&Self::query_body())
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!(status = status.as_u16(), "Problem downloading launch data");
            return Err(Error::Fetch {
                status: status.as_u16(),
            });
        }

        let body: QueryResponse = response.json().await?;
        debug!(count = body.docs.len(), "Launch data downloaded");

        Ok(body.docs)
    }
}
