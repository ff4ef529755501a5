use actix_web::HttpServer;
use std::{io, sync::Arc};
use tracing::info;
use weather_history::{
    AppConfig, AppContext, AppMetrics, BlobStore, Collector, CorsConfig, HistoryService,
    MetricsConfig, TableStore, WeatherClient, connect_backends, create_app, init_tracing,
    spawn_collection_schedule,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Required settings are checked before anything else starts
    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    init_tracing(config.log_format);

    let metrics = AppMetrics::new().map_err(io::Error::other)?;

    let (table_backend, blob_backend) = connect_backends(&config.storage)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let table = TableStore::new(table_backend)
        .with_skip_counter(metrics.weather_history_records_skipped_total.clone());
    let blob = BlobStore::new(blob_backend);

    let client = WeatherClient::new(&config.weather).map_err(io::Error::other)?;
    let collector = Collector::new(
        Arc::new(client),
        table.clone(),
        blob,
        config.weather.city_name.clone(),
    )
    .with_outcome_counter(metrics.weather_collections_total.clone());
    let _schedule = spawn_collection_schedule(collector, config.collect_interval_seconds);

    let context = AppContext {
        history: HistoryService::new(table, config.weather.city_name.clone(), config.require_api_key),
        metrics,
        metrics_config: MetricsConfig::from_env(),
        cors: CorsConfig::from_env(),
    };

    info!(
        bind_address = %config.bind_address,
        storage = %config.storage.backend,
        city = %config.weather.city_name,
        "Server starting"
    );

    HttpServer::new(move || create_app(context.clone()))
        .bind(&config.bind_address)?
        .run()
        .await
}
