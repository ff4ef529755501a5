//! Health check endpoint handler.

use crate::{models::HealthResponse, services::HistoryService};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Liveness only; the storage backend is reported but not probed.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API and the storage backend in use.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse)
    )
)]
pub async fn health(req: HttpRequest) -> Result<web::Json<HealthResponse>, Error> {
    let storage = req
        .app_data::<web::Data<HistoryService>>()
        .map(|service| service.storage_backend())
        .unwrap_or("unknown");

    Ok(web::Json(HealthResponse {
        status: "healthy".to_string(),
        storage: storage.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryTable, TableStore};
    use actix_web::{App, test};
    use paperclip::actix::{OpenApiExt, web as api};
    use std::sync::Arc;

    #[actix_web::test]
    async fn reports_table_backend_name() {
        let service = HistoryService::new(TableStore::new(Arc::new(MemoryTable::new())), "Tokyo", true);
        let app = test::init_service(
            App::new()
                .wrap_api()
                .app_data(web::Data::new(service))
                .service(api::resource("/api/health").route(api::get().to(health)))
                .build(),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.storage, "memory");
    }

    #[actix_web::test]
    async fn reports_unknown_without_history_service() {
        let app = test::init_service(
            App::new()
                .wrap_api()
                .service(api::resource("/api/health").route(api::get().to(health)))
                .build(),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.storage, "unknown");
    }
}
