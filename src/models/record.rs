//! Persisted shapes: the table-store record and the blob-store archive.

use crate::models::WeatherReading;
use chrono::{DateTime, Utc};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// One collection event as stored in the table store, keyed by `(id, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// `<city>-<unix seconds at collection>`
    pub id: String,
    /// RFC 3339, second precision, UTC.
    pub timestamp: String,
    pub city_name: String,
    /// Celsius
    pub temperature: f64,
    pub description: String,
    pub humidity: i64,
    pub pressure: i64,
    pub wind_speed: f64,
    pub country: String,
    pub created_at: DateTime<Utc>,
    /// Expiry marker in unix seconds, honoured by the store's own TTL sweep.
    pub ttl: i64,
}

/// Archival copy written to the blob store: the record fields inline plus the raw reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivalEnvelope {
    #[serde(flatten)]
    pub record: WeatherRecord,
    pub raw_response: WeatherReading,
}
