use actix_web::{
    http::{Method, StatusCode},
    test,
};
use std::sync::Arc;
use weather_history::{
    AppContext, AppMetrics, CorsConfig, HISTORY_ROUTE, HistoryService, MemoryTable,
    MetricsConfig, TableStore, create_app,
};

fn context() -> AppContext {
    AppContext {
        history: HistoryService::new(TableStore::new(Arc::new(MemoryTable::new())), "Tokyo", true),
        metrics: AppMetrics::new().unwrap(),
        metrics_config: MetricsConfig::default(),
        cors: CorsConfig::default(),
    }
}

/// Health check through the full middleware stack
#[actix_web::test]
async fn test_health_endpoint_integration() {
    let app = test::init_service(create_app(context())).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK, "Expected 200 OK status");
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(
        content_type.contains("application/json"),
        "Expected JSON content type, got: {content_type}"
    );

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        json,
        serde_json::json!({"status": "healthy", "storage": "memory"})
    );
}

#[actix_web::test]
async fn test_version_endpoint_integration() {
    let app = test::init_service(create_app(context())).await;

    let req = test::TestRequest::get().uri("/api/version").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["commit"].is_string());
    assert!(json["build_time"].is_string());
}

#[actix_web::test]
async fn test_request_id_header_added() {
    let app = test::init_service(create_app(context())).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    let request_id = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok(), "Expected a UUID, got {request_id}");
}

/// CORS headers are stamped on every route, including unknown ones
#[actix_web::test]
async fn test_cors_headers_on_every_response() {
    let app = test::init_service(create_app(context())).await;

    for uri in ["/api/health", "/api/version", "/does-not-exist"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*",
            "missing CORS header on {uri}"
        );
    }
}

/// The history route answers every method itself instead of falling through to 404
#[actix_web::test]
async fn test_history_route_reaches_handler_for_every_method() {
    let app = test::init_service(create_app(context())).await;

    let cases = [
        (Method::OPTIONS, StatusCode::OK),
        (Method::GET, StatusCode::UNAUTHORIZED),
        (Method::POST, StatusCode::METHOD_NOT_ALLOWED),
        (Method::PUT, StatusCode::METHOD_NOT_ALLOWED),
        (Method::DELETE, StatusCode::METHOD_NOT_ALLOWED),
        (Method::PATCH, StatusCode::METHOD_NOT_ALLOWED),
    ];

    for (method, expected) in cases {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri(HISTORY_ROUTE)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "unexpected status for {method}");
    }

    let req = test::TestRequest::get()
        .uri(HISTORY_ROUTE)
        .insert_header(("X-API-Key", "test-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["period"], "6h");
}

#[actix_web::test]
async fn test_metrics_endpoint_integration() {
    let app = test::init_service(create_app(context())).await;

    let req = test::TestRequest::get()
        .uri(HISTORY_ROUTE)
        .insert_header(("X-API-Key", "test-key"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );

    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains(&format!("route=\"{HISTORY_ROUTE}\"")));
    assert!(body.contains("app_uptime_seconds"));
    assert!(body.contains("app_info"));
    assert!(body.contains("weather_history_records_skipped_total"));
}

#[actix_web::test]
async fn test_metrics_endpoint_disabled() {
    let mut ctx = context();
    ctx.metrics_config = MetricsConfig { enabled: false };
    let app = test::init_service(create_app(ctx)).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Metrics collection is disabled");
}

#[actix_web::test]
async fn test_openapi_spec_lists_routes() {
    let app = test::init_service(create_app(context())).await;

    let req = test::TestRequest::get().uri("/api/spec/v2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let spec: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(spec["info"]["title"], "Weather History API");
    let paths = spec["paths"].as_object().unwrap();
    for route in [HISTORY_ROUTE, "/api/health", "/api/version", "/api/metrics"] {
        assert!(paths.contains_key(route), "spec is missing {route}");
    }
}
