//! Weather History - collects current weather on a schedule and serves it back by time window
//!
//! One process plays two roles:
//! - a collector that fetches current conditions from OpenWeather for the
//!   configured city, writes a flattened record to the table store and a raw
//!   archive to the blob store
//! - an HTTP API whose history endpoint filters stored records by city and
//!   look-back period
//!
//! ## Architecture
//!
//! - `config/` - environment configuration, loaded once at startup
//! - `models/` - provider payloads, stored records and API bodies
//! - `services/` - weather client, record mapper, collector, history queries, metrics
//! - `storage/` - table and blob accessors over in-memory or AWS backends
//! - `handlers/` - HTTP handlers and the app factory
//! - `middleware/` - CORS headers, request IDs, request metrics
//! - `utils/` - request helpers and timestamp formatting
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use weather_history::{
//!     AppContext, AppMetrics, CorsConfig, HistoryService, MemoryTable, MetricsConfig, TableStore,
//!     create_app,
//! };
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let table = TableStore::new(Arc::new(MemoryTable::new()));
//!     let context = AppContext {
//!         history: HistoryService::new(table, "Tokyo", true),
//!         metrics: AppMetrics::new().map_err(std::io::Error::other)?,
//!         metrics_config: MetricsConfig::default(),
//!         cors: CorsConfig::default(),
//!     };
//!     let _app = create_app(context);
//!     // Configure and run the server
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod utils;

pub use config::{AppConfig, ConfigError, CorsConfig, LogFormat, MetricsConfig, StorageBackend};
pub use handlers::{
    AppContext, HISTORY_ROUTE, create_app, create_openapi_spec, get_metrics, health, version,
    weather_history,
};
pub use middleware::{CorsHeaders, MetricsMiddleware, RequestIdMiddleware};
pub use models::{
    ArchivalEnvelope, CollectionSummary, CollectorResponse, ErrorBody, HealthResponse,
    HistoryParams, HistoryResponse, VersionResponse, WeatherReading, WeatherRecord,
};
pub use services::{
    AppMetrics, CollectionError, CollectionStage, Collector, HistoryError, HistoryQuery,
    HistoryService, Period, WeatherClient, WeatherClientError, WeatherSource, sanitize_city,
    spawn_collection_schedule, to_envelope, to_record,
};
pub use storage::{
    BlobBackend, BlobStore, MemoryBlob, MemoryTable, StoreError, TableBackend, TableStore,
    connect_backends,
};
pub use telemetry::init_tracing;
pub use utils::format_timestamp;
