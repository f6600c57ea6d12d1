// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for launchpad-core integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launchpad_core::persistence::{Persistence, SqlitePersistence};
use launchpad_core::{HabitablePlanetFilter, LaunchDirectory, SpaceXProvider};

pub const QUERY_PATH: &str = "/v4/launches/query";

/// Kepler dataset excerpt: five confirmed habitable planets among decoys.
pub const KEPLER_SAMPLE: &str = "\
# This file was produced by the NASA Exoplanet Archive  http://exoplanetarchive.ipac.caltech.edu
# Tue Jul 20 10:34:42 2021
#
# COLUMN kepid:          KepID
# COLUMN kepler_name:    Kepler Name
# COLUMN koi_disposition: Exoplanet Archive Disposition
# COLUMN koi_insol:      Insolation Flux [Earth flux]
# COLUMN koi_prad:       Planetary Radius [Earth radii]
#
kepid,kepoi_name,kepler_name,koi_disposition,koi_insol,koi_prad
10797460,K00752.01,Kepler-227 b,CONFIRMED,93.59,2.26
10811496,K00753.01,,CANDIDATE,39.3,14.6
10848459,K00754.01,,FALSE POSITIVE,891.96,33.46
11853905,K01422.04,Kepler-1652 b,CONFIRMED,0.84,1.6
10604335,K00701.03,Kepler-62 f,CONFIRMED,0.41,1.41
9002278,K00701.04,Kepler-62 e,CONFIRMED,1.17,1.61
4138008,K01686.01,Kepler-1649 c,CONFIRMED,,1.06
5640085,K00448.02,Kepler-442 b,CONFIRMED,0.7,1.34
8311864,K01430.03,Kepler-296 e,CONFIRMED,1.08,1.5
8120608,K00571.05,Kepler-186 f,CONFIRMED,0.38,1.17
6444896,K02418.01,Kepler-1229 b,CONFIRMED,0.5,1.4
";

/// Names in [`KEPLER_SAMPLE`] that pass the habitability predicate.
pub const HABITABLE_SAMPLE: [&str; 5] = [
    "Kepler-1229 b",
    "Kepler-186 f",
    "Kepler-296 e",
    "Kepler-442 b",
    "Kepler-62 f",
];

/// Fresh in-memory store with migrations applied.
pub async fn memory_store() -> Arc<dyn Persistence> {
    Arc::new(
        SqlitePersistence::connect("sqlite::memory:", 1)
            .await
            .expect("Failed to open in-memory store"),
    )
}

/// Launch directory talking to `mock_server`.
pub fn directory(store: Arc<dyn Persistence>, mock_server: &MockServer) -> LaunchDirectory {
    let provider = SpaceXProvider::new(format!("{}{}", mock_server.uri(), QUERY_PATH));
    LaunchDirectory::new(store, Arc::new(provider))
}

/// Planet filter over `store` preloaded with [`KEPLER_SAMPLE`].
pub async fn loaded_planets(store: Arc<dyn Persistence>) -> HabitablePlanetFilter {
    let filter = HabitablePlanetFilter::new(store);
    filter
        .load_planets_from_reader(KEPLER_SAMPLE.as_bytes())
        .await
        .expect("Failed to load sample planets");
    filter
}

/// A provider launch document with populated rocket and payloads.
pub fn launch_doc(flight_number: i64, name: &str, rocket: &str, customers: &[&str]) -> Value {
    json!({
        "flight_number": flight_number,
        "name": name,
        "rocket": { "name": rocket, "id": format!("rocket-{flight_number}") },
        "date_local": "2008-09-28T11:15:00+12:00",
        "upcoming": false,
        "success": true,
        "payloads": [{ "customers": customers }],
        "id": format!("launch-{flight_number}")
    })
}

/// The first four Falcon 1 flights, starting with the FalconSat sentinel.
pub fn falcon_one_docs() -> Vec<Value> {
    vec![
        launch_doc(1, "FalconSat", "Falcon 1", &["DARPA"]),
        launch_doc(2, "DemoSat", "Falcon 1", &["DARPA"]),
        launch_doc(3, "Trailblazer", "Falcon 1", &["NASA", "ORS"]),
        launch_doc(4, "RatSat", "Falcon 1", &["SpaceX"]),
    ]
}

/// Mount a query endpoint answering with `docs`, expected to be hit `times` times.
pub async fn mount_launches(mock_server: &MockServer, docs: Vec<Value>, times: u64) {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": docs,
            "totalDocs": 4,
            "pagingCounter": 1
        })))
        .expect(times)
        .mount(mock_server)
        .await;
}

macro_rules! skip_if_no_db {
    () => {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        }
    };
}

pub(crate) use skip_if_no_db;
