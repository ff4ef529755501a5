//! Weather history endpoint handler.

use crate::{
    models::{ErrorBody, HistoryParams},
    services::{HistoryError, HistoryService},
    utils::has_api_key,
};
use actix_web::{
    Error, HttpRequest, HttpResponse, ResponseError, Result,
    http::{Method, StatusCode, header::ContentType},
    web,
};
use chrono::Utc;
use paperclip::actix::api_v2_operation;
use tracing::debug;

impl ResponseError for HistoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            HistoryError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HistoryError::MissingApiKey => StatusCode::UNAUTHORIZED,
            HistoryError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            HistoryError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Pull `period` and `city` out of a raw query string; the last occurrence wins.
fn history_params(query: &str) -> HistoryParams {
    let mut params = HistoryParams::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "period" => params.period = Some(value.into_owned()),
            "city" => params.city = Some(value.into_owned()),
            _ => {}
        }
    }
    params
}

/// Weather history endpoint
///
/// Every method is routed here so that unsupported ones get a JSON 405.
#[api_v2_operation(
    summary = "Weather History Endpoint",
    description = "Returns stored weather records for a city over the last period. \
                   `period` is 6h, 24h, 1d or a number of hours from 1 to 168 (default 6h); \
                   `city` defaults to the configured city. Requires an X-API-Key header.",
    tags("Weather"),
    responses(
        (status = 200, description = "Records ordered by timestamp", body = crate::models::HistoryResponse),
        (status = 400, description = "Invalid period parameter"),
        (status = 401, description = "API key required"),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Failed to retrieve weather history")
    )
)]
pub async fn weather_history(req: HttpRequest) -> Result<HttpResponse, Error> {
    let service = req
        .app_data::<web::Data<HistoryService>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("History service not configured"))?;

    if req.method() == Method::OPTIONS {
        return Ok(HttpResponse::Ok().insert_header(ContentType::json()).finish());
    }

    if req.method() != Method::GET {
        return Err(HistoryError::MethodNotAllowed.into());
    }

    if service.requires_api_key() && !has_api_key(&req) {
        return Err(HistoryError::MissingApiKey.into());
    }

    let params = history_params(req.query_string());
    debug!(period = ?params.period, city = ?params.city, "History request");

    let response = service.query(&params, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(response))
}
