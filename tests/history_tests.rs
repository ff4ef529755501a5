use actix_web::{
    http::{Method, StatusCode},
    test,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use weather_history::{
    AppContext, AppMetrics, CorsConfig, HISTORY_ROUTE, HistoryService, MemoryTable,
    MetricsConfig, StoreError, TableBackend, TableStore, WeatherRecord, create_app,
    format_timestamp,
    storage::{Item, KeyQuery, ScanFilter, ScanPage},
};

const API_KEY: (&str, &str) = ("X-API-Key", "test-key");

fn context(table: TableStore, require_api_key: bool) -> AppContext {
    AppContext {
        history: HistoryService::new(table, "Tokyo", require_api_key),
        metrics: AppMetrics::new().unwrap(),
        metrics_config: MetricsConfig::default(),
        cors: CorsConfig::default(),
    }
}

fn memory_context() -> AppContext {
    context(TableStore::new(Arc::new(MemoryTable::new())), true)
}

fn record(city: &str, at: DateTime<Utc>) -> WeatherRecord {
    WeatherRecord {
        id: format!("{city}-{}", at.timestamp()),
        timestamp: format_timestamp(at),
        city_name: city.to_string(),
        temperature: 20.0,
        description: "few clouds".to_string(),
        humidity: 55,
        pressure: 1012,
        wind_speed: 2.1,
        country: "JP".to_string(),
        created_at: at,
        ttl: at.timestamp() + 2_592_000,
    }
}

fn history_uri(query: &str) -> String {
    if query.is_empty() {
        HISTORY_ROUTE.to_string()
    } else {
        format!("{HISTORY_ROUTE}?{query}")
    }
}

/// Table backend whose every call fails
struct UnavailableTable;

#[async_trait]
impl TableBackend for UnavailableTable {
    async fn put_item(&self, _item: Item) -> Result<(), StoreError> {
        Err(StoreError::Write("connection reset".to_string()))
    }

    async fn get_item(&self, _id: &str, _timestamp: &str) -> Result<Option<Item>, StoreError> {
        Err(StoreError::Read("connection reset".to_string()))
    }

    async fn scan(&self, _filter: &ScanFilter, _start: Option<Item>) -> Result<ScanPage, StoreError> {
        Err(StoreError::Read("connection reset".to_string()))
    }

    async fn query(&self, _query: &KeyQuery, _start: Option<Item>) -> Result<ScanPage, StoreError> {
        Err(StoreError::Read("connection reset".to_string()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

fn assert_cors_headers(resp: &actix_web::dev::ServiceResponse) {
    let headers = resp.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "GET,OPTIONS");
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token"
    );
}

/// OPTIONS short-circuits before the key check and parameter validation
#[actix_web::test]
async fn test_options_preflight_returns_empty_ok() {
    let app = test::init_service(create_app(memory_context())).await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri(&history_uri("period=abc&city=%21%21"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors_headers(&resp);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    let body = test::read_body(resp).await;
    assert!(body.is_empty(), "preflight body should be empty");
}

#[actix_web::test]
async fn test_unsupported_methods_return_405() {
    let app = test::init_service(create_app(memory_context())).await;

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri(HISTORY_ROUTE)
            .insert_header(API_KEY)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_cors_headers(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Method not allowed"}));
    }
}

#[actix_web::test]
async fn test_missing_api_key_is_rejected_before_validation() {
    let app = test::init_service(create_app(memory_context())).await;

    let req = test::TestRequest::get()
        .uri(&history_uri("period=not-a-period"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_cors_headers(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "API key required"}));
}

#[actix_web::test]
async fn test_api_key_check_can_be_disabled() {
    let table = TableStore::new(Arc::new(MemoryTable::new()));
    let app = test::init_service(create_app(context(table, false))).await;

    let req = test::TestRequest::get().uri(HISTORY_ROUTE).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_invalid_periods_return_400() {
    let app = test::init_service(create_app(memory_context())).await;

    for period in ["0", "169", "abc", "-5", "6hx", "06", "1.5", "7d", "%206h"] {
        let req = test::TestRequest::get()
            .uri(&history_uri(&format!("period={period}")))
            .insert_header(API_KEY)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "period {period:?}");
        assert_cors_headers(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Invalid period parameter"}));
    }
}

#[actix_web::test]
async fn test_valid_periods_set_the_window() {
    let app = test::init_service(create_app(memory_context())).await;

    for (period, hours) in [
        ("6h", 6),
        ("24h", 24),
        ("1d", 24),
        ("1", 1),
        ("6", 6),
        ("109", 109),
        ("168", 168),
    ] {
        let req = test::TestRequest::get()
            .uri(&history_uri(&format!("period={period}")))
            .insert_header(API_KEY)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "period {period:?}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["period"], period);

        let start = DateTime::parse_from_rfc3339(body["startTime"].as_str().unwrap()).unwrap();
        let end = DateTime::parse_from_rfc3339(body["endTime"].as_str().unwrap()).unwrap();
        assert_eq!(end - start, TimeDelta::hours(hours), "period {period:?}");
    }
}

#[actix_web::test]
async fn test_default_period_and_city() {
    let table = TableStore::new(Arc::new(MemoryTable::new()));
    table
        .put(&record("Tokyo", Utc::now() - TimeDelta::hours(2)))
        .await
        .unwrap();
    let app = test::init_service(create_app(context(table, true))).await;

    let req = test::TestRequest::get()
        .uri(&history_uri("period=&city="))
        .insert_header(API_KEY)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["message"], "Weather history retrieved successfully");
    assert_eq!(body["period"], "6h");
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["cityName"], "Tokyo");
}

/// Records at T-10h, T-3h and T-1h; a 6h query sees only the last two, oldest first
#[actix_web::test]
async fn test_six_hour_window_scenario() {
    let now = Utc::now();
    let table = TableStore::new(Arc::new(MemoryTable::new()));
    for hours_ago in [1, 10, 3] {
        table
            .put(&record("Tokyo", now - TimeDelta::hours(hours_ago)))
            .await
            .unwrap();
    }
    table
        .put(&record("Osaka", now - TimeDelta::hours(2)))
        .await
        .unwrap();
    let app = test::init_service(create_app(context(table, true))).await;

    let req = test::TestRequest::get()
        .uri(&history_uri("period=6h&city=Tokyo"))
        .insert_header(API_KEY)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 2);
    let timestamps: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap())
        .collect();
    assert_eq!(
        timestamps,
        vec![
            format_timestamp(now - TimeDelta::hours(3)),
            format_timestamp(now - TimeDelta::hours(1)),
        ]
    );
}

#[actix_web::test]
async fn test_city_parameter_is_sanitized() {
    let table = TableStore::new(Arc::new(MemoryTable::new()));
    table
        .put(&record("New York", Utc::now() - TimeDelta::hours(1)))
        .await
        .unwrap();
    let app = test::init_service(create_app(context(table, true))).await;

    let req = test::TestRequest::get()
        .uri(&history_uri("city=%20New%20York123%21%20"))
        .insert_header(API_KEY)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["cityName"], "New York");
}

/// One malformed row in the window is skipped and counted, not surfaced
#[actix_web::test]
async fn test_malformed_rows_are_skipped() {
    let now = Utc::now();
    let backend = Arc::new(MemoryTable::new());
    let metrics = AppMetrics::new().unwrap();
    let table = TableStore::new(backend.clone())
        .with_skip_counter(metrics.weather_history_records_skipped_total.clone());

    table.put(&record("Tokyo", now - TimeDelta::hours(4))).await.unwrap();
    table.put(&record("Tokyo", now - TimeDelta::hours(2))).await.unwrap();

    let malformed = json!({
        "id": "Tokyo-broken",
        "timestamp": format_timestamp(now - TimeDelta::hours(3)),
        "cityName": "Tokyo",
        "temperature": "warm"
    });
    let Value::Object(malformed) = malformed else {
        unreachable!()
    };
    backend.insert_raw(malformed).await;

    let mut ctx = context(table, true);
    ctx.metrics = metrics.clone();
    let app = test::init_service(create_app(ctx)).await;

    let req = test::TestRequest::get()
        .uri(HISTORY_ROUTE)
        .insert_header(API_KEY)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 2);
    assert_eq!(metrics.weather_history_records_skipped_total.get(), 1);
}

#[actix_web::test]
async fn test_store_failure_returns_500() {
    let table = TableStore::new(Arc::new(UnavailableTable));
    let app = test::init_service(create_app(context(table, true))).await;

    let req = test::TestRequest::get()
        .uri(HISTORY_ROUTE)
        .insert_header(API_KEY)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Failed to retrieve weather history"}));
}

#[actix_web::test]
async fn test_request_id_is_echoed() {
    let app = test::init_service(create_app(memory_context())).await;

    let req = test::TestRequest::get()
        .uri(HISTORY_ROUTE)
        .insert_header(API_KEY)
        .insert_header(("X-Request-ID", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-123");
}
