//! API request/response models.

use crate::models::WeatherRecord;
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
    /// Name of the table backend in use (`dynamodb` or `memory`)
    pub storage: String,
}

/// Response model for the version information endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// Query parameters accepted by the history endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Apiv2Schema)]
pub struct HistoryParams {
    /// "6h", "24h", "1d" or a number of hours between 1 and 168
    pub period: Option<String>,
    /// City name; defaults to the configured city
    pub city: Option<String>,
}

/// Successful history response
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub status_code: u16,
    pub message: String,
    pub data: Vec<WeatherRecord>,
    pub count: usize,
    pub period: String,
    pub start_time: String,
    pub end_time: String,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of one collection event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorResponse {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CollectionSummary>,
}

/// Short summary of a stored record, reported after a successful collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub timestamp: String,
    pub record_id: String,
}
