// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Habitable planet filter.
//!
//! Streams the Kepler objects-of-interest table (a `#`-commented CSV with a
//! header row), keeps confirmed planets with Earth-like insolation and radius,
//! and upserts them into the planet set by Kepler name.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::error::{Error, Result};
use crate::persistence::{Persistence, Planet};

/// Lower insolation bound (exclusive), in Earth fluxes.
pub const MIN_INSOLATION: f64 = 0.36;
/// Upper insolation bound (exclusive), in Earth fluxes.
pub const MAX_INSOLATION: f64 = 1.11;
/// Upper planetary radius bound (exclusive), in Earth radii.
pub const MAX_PLANETARY_RADIUS: f64 = 1.6;

/// Parsed rows buffered between the reader thread and the upsert loop.
const ROW_BUFFER: usize = 64;

/// One row of the Kepler dataset. Only the columns the filter needs are read.
///
/// Empty or non-numeric measurements deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KoiRecord {
    /// Catalogue name, empty for unconfirmed candidates.
    #[serde(default)]
    pub kepler_name: String,
    /// `CONFIRMED`, `CANDIDATE` or `FALSE POSITIVE`.
    #[serde(default)]
    pub koi_disposition: String,
    /// Insolation flux relative to Earth.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub koi_insol: Option<f64>,
    /// Planetary radius in Earth radii.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub koi_prad: Option<f64>,
}

/// Whether a candidate is a confirmed, potentially habitable planet.
pub fn is_habitable_planet(record: &KoiRecord) -> bool {
    let confirmed = record.koi_disposition == "CONFIRMED";
    let insolation_ok = record
        .koi_insol
        .is_some_and(|insol| insol > MIN_INSOLATION && insol < MAX_INSOLATION);
    let radius_ok = record
        .koi_prad
        .is_some_and(|prad| prad < MAX_PLANETARY_RADIUS);

    confirmed && insolation_ok && radius_ok
}

/// Outcome of a planet load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanetLoadSummary {
    /// Data rows read from the dataset.
    pub rows_read: u64,
    /// Rows that passed the habitability predicate.
    pub habitable: u64,
    /// Planets newly inserted by this load.
    pub inserted: u64,
    /// Planets in the store after the load.
    pub total_planets: i64,
}

/// Loads habitable planets into the store and serves the planet set.
#[derive(Clone)]
pub struct HabitablePlanetFilter {
    persistence: Arc<dyn Persistence>,
}

impl HabitablePlanetFilter {
    /// Create a filter writing to `persistence`.
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self { persistence }
    }

    /// Load the dataset at `path`.
    pub async fn load_planets(&self, path: impl AsRef<Path>) -> Result<PlanetLoadSummary> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to open planet dataset");
            Error::DataLoad(format!("{}: {}", path.display(), e))
        })?;

        self.load_planets_from_reader(file).await
    }

    /// Stream rows from `reader`, upserting habitable planets one at a time.
    ///
    /// Parsing runs on a blocking thread and hands rows over in file order.
    /// Each upsert is awaited before the next row is taken. A failed upsert is
    /// logged and skipped. A read error aborts the load with
    /// [`Error::DataLoad`]; planets stored before the failure stay stored.
    #[instrument(skip_all)]
    pub async fn load_planets_from_reader<R>(&self, reader: R) -> Result<PlanetLoadSummary>
    where
        R: Read + Send + 'static,
    {
        let (tx, mut rows) = mpsc::channel::<csv::Result<KoiRecord>>(ROW_BUFFER);
        let parser = tokio::task::spawn_blocking(move || {
            let mut csv_reader = csv::ReaderBuilder::new()
                .comment(Some(b'#'))
                .has_headers(true)
                .from_reader(reader);

            for row in csv_reader.deserialize::<KoiRecord>() {
                let failed = row.is_err();
                // Receiver gone means the load already stopped.
                if tx.blocking_send(row).is_err() || failed {
                    break;
                }
            }
        });

        let mut summary = PlanetLoadSummary::default();

        while let Some(row) = rows.recv().await {
            let record = row.map_err(|e| {
                error!(row = summary.rows_read + 1, error = %e, "Failed to read planet dataset");
                Error::from(e)
            })?;
            summary.rows_read += 1;

            if !is_habitable_planet(&record) {
                continue;
            }
            summary.habitable += 1;

            if record.kepler_name.trim().is_empty() {
                warn!(row = summary.rows_read, "Habitable row without a Kepler name, skipping");
                continue;
            }

            match self.persistence.upsert_planet(&record.kepler_name).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => {}
                Err(e) => warn!(
                    kepler_name = %record.kepler_name,
                    error = %e,
                    "Could not save planet"
                ),
            }
        }

        parser
            .await
            .map_err(|e| Error::DataLoad(format!("planet dataset reader failed: {}", e)))?;

        summary.total_planets = self.persistence.count_planets().await?;
        info!(
            rows_read = summary.rows_read,
            habitable = summary.habitable,
            inserted = summary.inserted,
            "{} habitable planets found",
            summary.total_planets
        );

        Ok(summary)
    }

    /// All stored planets.
    pub async fn get_all_planets(&self) -> Result<Vec<Planet>> {
        self.persistence.list_planets().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{Launch, LaunchFilter, SqlitePersistence};
    use async_trait::async_trait;

    /// In-memory store that refuses to save one planet.
    struct RejectingStore {
        inner: SqlitePersistence,
        rejected: &'static str,
    }

    #[async_trait]
    impl Persistence for RejectingStore {
        async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
            self.inner.find_launch(filter).await
        }

        async fn latest_flight_number(&self) -> Result<Option<i64>> {
            self.inner.latest_flight_number().await
        }

        async fn list_launches(&self, skip: u64, limit: Option<u64>) -> Result<Vec<Launch>> {
            self.inner.list_launches(skip, limit).await
        }

        async fn count_launches(&self) -> Result<i64> {
            self.inner.count_launches().await
        }

        async fn upsert_launch(&self, launch: &Launch) -> Result<()> {
            self.inner.upsert_launch(launch).await
        }

        async fn abort_launch(&self, flight_number: i64) -> Result<u64> {
            self.inner.abort_launch(flight_number).await
        }

        async fn get_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
            self.inner.get_planet(kepler_name).await
        }

        async fn upsert_planet(&self, kepler_name: &str) -> Result<bool> {
            if kepler_name == self.rejected {
                return Err(Error::database("upsert_planet", "database is locked"));
            }
            self.inner.upsert_planet(kepler_name).await
        }

        async fn list_planets(&self) -> Result<Vec<Planet>> {
            self.inner.list_planets().await
        }

        async fn count_planets(&self) -> Result<i64> {
            self.inner.count_planets().await
        }

        async fn health_check(&self) -> Result<bool> {
            self.inner.health_check().await
        }
    }

    fn record(disposition: &str, insol: f64, prad: f64) -> KoiRecord {
        KoiRecord {
            kepler_name: "Kepler-1 b".to_string(),
            koi_disposition: disposition.to_string(),
            koi_insol: Some(insol),
            koi_prad: Some(prad),
        }
    }

    #[test]
    fn test_is_habitable_planet_scenarios() {
        assert!(is_habitable_planet(&record("CONFIRMED", 0.5, 1.0)));
        assert!(!is_habitable_planet(&record("FALSE POSITIVE", 0.5, 1.0)));
        assert!(!is_habitable_planet(&record("CANDIDATE", 0.5, 1.0)));
        assert!(!is_habitable_planet(&record("CONFIRMED", 0.36, 1.0)));
        assert!(!is_habitable_planet(&record("CONFIRMED", 1.11, 1.0)));
        assert!(!is_habitable_planet(&record("CONFIRMED", 0.5, 1.6)));
        assert!(is_habitable_planet(&record("CONFIRMED", 1.1, 1.59)));
    }

    #[test]
    fn test_missing_measurements_are_not_habitable() {
        let mut no_insol = record("CONFIRMED", 0.5, 1.0);
        no_insol.koi_insol = None;
        assert!(!is_habitable_planet(&no_insol));

        let mut no_prad = record("CONFIRMED", 0.5, 1.0);
        no_prad.koi_prad = None;
        assert!(!is_habitable_planet(&no_prad));
    }

    #[test]
    fn test_record_deserializes_blank_numbers_as_none() {
        let data = "kepid,kepler_name,koi_disposition,koi_insol,koi_prad\n\
                    1,,CANDIDATE,,n/a\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: KoiRecord = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(row.kepler_name, "");
        assert_eq!(row.koi_insol, None);
        assert_eq!(row.koi_prad, None);
    }

    #[tokio::test]
    async fn test_load_planets_from_reader() {
        let persistence = Arc::new(SqlitePersistence::connect("sqlite::memory:", 1).await.unwrap());
        let filter = HabitablePlanetFilter::new(persistence);

        let data = "\
# This file was produced by the NASA Exoplanet Archive
# COLUMN koi_insol: Insolation Flux [Earth flux]
kepid,kepler_name,koi_disposition,koi_insol,koi_prad
10593626,Kepler-227 b,CONFIRMED,93.59,2.26
10811496,Kepler-1652 b,CONFIRMED,0.84,1.6
11853905,Kepler-442 b,CONFIRMED,0.7,1.34
6521045,,CANDIDATE,0.9,1.1
9002278,Kepler-62 f,CONFIRMED,0.41,1.41
";

        let summary = filter
            .load_planets_from_reader(data.as_bytes())
            .await
            .expect("load should succeed");

        assert_eq!(summary.rows_read, 5);
        assert_eq!(summary.habitable, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.total_planets, 2);

        let names: Vec<String> = filter
            .get_all_planets()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.kepler_name)
            .collect();
        assert_eq!(names, vec!["Kepler-442 b", "Kepler-62 f"]);
    }

    #[tokio::test]
    async fn test_failed_planet_save_is_skipped() {
        let store = RejectingStore {
            inner: SqlitePersistence::connect("sqlite::memory:", 1).await.unwrap(),
            rejected: "Kepler-442 b",
        };
        let filter = HabitablePlanetFilter::new(Arc::new(store));

        let data = "\
kepid,kepler_name,koi_disposition,koi_insol,koi_prad
10604335,Kepler-62 f,CONFIRMED,0.41,1.41
5640085,Kepler-442 b,CONFIRMED,0.7,1.34
8311864,Kepler-296 e,CONFIRMED,1.08,1.5
8120608,Kepler-186 f,CONFIRMED,0.38,1.17
";

        let summary = filter
            .load_planets_from_reader(data.as_bytes())
            .await
            .expect("a failed save should not abort the load");

        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.habitable, 4);
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.total_planets, 3);

        let names: Vec<String> = filter
            .get_all_planets()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.kepler_name)
            .collect();
        assert_eq!(names, vec!["Kepler-186 f", "Kepler-296 e", "Kepler-62 f"]);
    }
}
