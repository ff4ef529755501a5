//! Blob store accessor for archival envelopes.

use crate::{models::ArchivalEnvelope, storage::StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

/// Root prefix for every archived object.
pub const ARCHIVE_PREFIX: &str = "weather-data";

/// An object ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: BTreeMap<String, String>,
}

/// Listing entry for a stored object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Primitive operations a blob backend must provide.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError>;

    /// `Ok(None)` when no object exists under `key`.
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Every object whose key starts with `prefix`, in key order.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    fn name(&self) -> &'static str;
}

/// Writes and reads [`ArchivalEnvelope`]s on top of a [`BlobBackend`].
#[derive(Clone)]
pub struct BlobStore {
    backend: Arc<dyn BlobBackend>,
}

impl BlobStore {
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self { backend }
    }

    /// Key for an envelope: `weather-data/<year>/<month>-<day>/<id>.json`,
    /// partitioned by the record's creation time.
    pub fn key_for(envelope: &ArchivalEnvelope) -> String {
        let created = envelope.record.created_at;
        format!(
            "{ARCHIVE_PREFIX}/{}/{}/{}.json",
            created.format("%Y"),
            created.format("%m-%d"),
            envelope.record.id
        )
    }

    /// Store the envelope as pretty-printed JSON and return its key.
    pub async fn put(&self, envelope: &ArchivalEnvelope) -> Result<String, StoreError> {
        let body = serde_json::to_vec_pretty(envelope).map_err(|e| StoreError::Write(e.to_string()))?;
        let key = Self::key_for(envelope);

        let record = &envelope.record;
        let metadata = BTreeMap::from([
            ("city".to_string(), record.city_name.clone()),
            ("country".to_string(), record.country.clone()),
            ("temperature".to_string(), format!("{:.2}", record.temperature)),
            ("timestamp".to_string(), record.timestamp.clone()),
        ]);

        self.backend
            .put_object(PutObject {
                key: key.clone(),
                body,
                content_type: "application/json".to_string(),
                metadata,
            })
            .await?;

        Ok(key)
    }

    pub async fn get(&self, key: &str) -> Result<ArchivalEnvelope, StoreError> {
        let body = self
            .backend
            .get_object(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("archive object {key}")))?;

        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        self.backend.list_objects(prefix).await
    }
}
