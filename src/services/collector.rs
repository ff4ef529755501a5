//! Scheduled collection: fetch, map, write table, write blob.

use crate::{
    models::{CollectionSummary, CollectorResponse},
    services::{
        mapper::{to_envelope, to_record},
        weather::{WeatherClientError, WeatherSource},
    },
    storage::{BlobStore, StoreError, TableStore},
};
use chrono::{DateTime, Utc};
use prometheus::IntCounterVec;
use std::{fmt, sync::Arc};
use tracing::{debug, error, info};

/// Steps of one collection event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStage {
    Idle,
    Fetching,
    Mapping,
    WritingTable,
    WritingBlob,
    Done,
}

impl fmt::Display for CollectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionStage::Idle => "idle",
            CollectionStage::Fetching => "fetching",
            CollectionStage::Mapping => "mapping",
            CollectionStage::WritingTable => "writing_table",
            CollectionStage::WritingBlob => "writing_blob",
            CollectionStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A failed collection. Writes completed before the failing stage are kept.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Failed to fetch weather data: {0}")]
    Fetch(#[source] WeatherClientError),

    #[error("Failed to store record to table store: {0}")]
    TableWrite(#[source] StoreError),

    #[error("Failed to store archive to blob store: {0}")]
    BlobWrite(#[source] StoreError),
}

impl CollectionError {
    /// The stage that failed
    pub fn stage(&self) -> CollectionStage {
        match self {
            CollectionError::Fetch(_) => CollectionStage::Fetching,
            CollectionError::TableWrite(_) => CollectionStage::WritingTable,
            CollectionError::BlobWrite(_) => CollectionStage::WritingBlob,
        }
    }
}

/// Runs collection events for one configured city
#[derive(Clone)]
pub struct Collector {
    source: Arc<dyn WeatherSource>,
    table: TableStore,
    blob: BlobStore,
    city: String,
    outcomes: Option<IntCounterVec>,
}

impl Collector {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        table: TableStore,
        blob: BlobStore,
        city: impl Into<String>,
    ) -> Self {
        Self {
            source,
            table,
            blob,
            city: city.into(),
            outcomes: None,
        }
    }

    /// Count outcomes on a counter labelled by `outcome` (`success` / `failure`).
    pub fn with_outcome_counter(mut self, counter: IntCounterVec) -> Self {
        self.outcomes = Some(counter);
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Run one collection event stamped with `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<CollectionSummary, CollectionError> {
        let mut stage = CollectionStage::Idle;
        debug!(city = %self.city, %stage, "Collection starting");

        stage = CollectionStage::Fetching;
        debug!(city = %self.city, %stage, "Collection stage");
        let reading = self
            .source
            .fetch(&self.city)
            .await
            .map_err(CollectionError::Fetch)?;

        stage = CollectionStage::Mapping;
        debug!(city = %self.city, %stage, "Collection stage");
        let record = to_record(&reading, now);

        stage = CollectionStage::WritingTable;
        debug!(city = %self.city, %stage, id = %record.id, "Collection stage");
        self.table
            .put(&record)
            .await
            .map_err(CollectionError::TableWrite)?;

        stage = CollectionStage::WritingBlob;
        debug!(city = %self.city, %stage, id = %record.id, "Collection stage");
        let summary = CollectionSummary {
            city: record.city_name.clone(),
            temperature: record.temperature,
            description: record.description.clone(),
            timestamp: record.timestamp.clone(),
            record_id: record.id.clone(),
        };
        let key = self
            .blob
            .put(&to_envelope(reading, record))
            .await
            .map_err(CollectionError::BlobWrite)?;

        stage = CollectionStage::Done;
        info!(
            city = %summary.city,
            %stage,
            id = %summary.record_id,
            temperature = summary.temperature,
            archive_key = %key,
            "Weather data collected"
        );

        Ok(summary)
    }

    /// Run one collection event now and report it as a status object.
    pub async fn handle(&self) -> CollectorResponse {
        let response = match self.run_at(Utc::now()).await {
            Ok(summary) => CollectorResponse {
                status_code: 200,
                message: "Weather data processed successfully".to_string(),
                data: Some(summary),
            },
            Err(e) => {
                error!(city = %self.city, stage = %e.stage(), error = %e, "Weather collection failed");
                CollectorResponse {
                    status_code: 500,
                    message: e.to_string(),
                    data: None,
                }
            }
        };

        if let Some(outcomes) = &self.outcomes {
            let outcome = if response.status_code == 200 {
                "success"
            } else {
                "failure"
            };
            outcomes.with_label_values(&[outcome]).inc();
        }

        response
    }
}
