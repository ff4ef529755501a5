//! OpenAPI specification generation and app factory.

use crate::{
    config::{CorsConfig, MetricsConfig},
    handlers::{get_metrics, health, version, weather_history},
    middleware::{CorsHeaders, MetricsMiddleware, RequestIdMiddleware},
    services::{AppMetrics, HistoryService},
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Route of the history query endpoint
pub const HISTORY_ROUTE: &str = "/api/weather/history";

/// Creates the OpenAPI document served at `/api/spec/v2`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Weather History API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Hourly weather observations collected from OpenWeather, queryable by city and time window.\n\n\
                ## Authentication\n\
                `GET /api/weather/history` requires an `X-API-Key` header. Only its presence is checked here; \
                the key itself is validated by the gateway in front of the service.\n\
                \n\
                ## Periods\n\
                `period` accepts `6h`, `24h`, `1d`, or a whole number of hours from 1 to 168. \
                Results are ordered by timestamp, oldest first.".into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Shared state handed to every worker's app instance
#[derive(Clone)]
pub struct AppContext {
    pub history: HistoryService,
    pub metrics: AppMetrics,
    pub metrics_config: MetricsConfig,
    pub cors: CorsConfig,
}

/// Creates the application with all routes and middleware
///
/// Used by the server binary and by the integration tests.
pub fn create_app(
    context: AppContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(CorsHeaders::new(context.cors))
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::new(context.history))
        .app_data(web::Data::new(context.metrics))
        .app_data(web::Data::new(context.metrics_config))
        // every method reaches the handler, which answers OPTIONS and 405 itself
        .service(web::resource(HISTORY_ROUTE).to(weather_history))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
