//! HTTP surface tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`; the ingest
//! trigger test runs against a wiremock site fixture.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use folio_harvest::config::{
    AuthConfig, Config, CrawlerConfig, OutputConfig, ServerConfig, SiteConfig,
};
use folio_harvest::model::BookRecord;
use folio_harvest::server::{build_router, AppState};
use folio_harvest::storage::{BookStore, SqliteStore};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    Config {
        site: SiteConfig {
            base_url: format!("{base_url}/"),
            catalogue_path: "catalogue/".to_string(),
        },
        crawler: CrawlerConfig {
            request_delay_ms: 1,
            fetch_timeout_secs: 5,
            page_budget: None,
            strict_discovery: false,
            user_agent: "folio-harvest-test/1.0".to_string(),
        },
        server: ServerConfig::default(),
        auth: AuthConfig {
            token_secret: "test-secret".to_string(),
            token_ttl_minutes: 30,
        },
        output: OutputConfig {
            database_path: "unused.db".to_string(),
        },
    }
}

fn record(source_url: &str, title: &str, category: &str, price: f64) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        category: category.to_string(),
        price,
        rating: 4,
        is_in_stock: true,
        availability_text: "In stock".to_string(),
        image_url: "https://books.example.com/media/x.jpg".to_string(),
        source_url: source_url.to_string(),
    }
}

/// Router over a temp store, optionally pre-seeded with records
fn test_app(base_url: &str, seed: &[BookRecord]) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteStore::new(&dir.path().join("books.db")).unwrap();
    if !seed.is_empty() {
        store.upsert_books(seed).unwrap();
    }
    let state = AppState::new(test_config(base_url), store);
    (dir, build_router(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login_token(app: &Router) -> String {
    let (status, _) = post_json(
        app,
        "/api/v1/auth/register",
        json!({"username": "admin", "password": "pw"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "admin", "password": "pw"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_healthz_reports_book_count() {
    let (_dir, app) = test_app("http://unused.example", &[record("u1", "A", "Travel", 1.0)]);

    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["books"], 1);
}

#[tokio::test]
async fn test_books_listing_and_lookup() {
    let (_dir, app) = test_app(
        "http://unused.example",
        &[
            record("u1", "Alpha", "Travel", 10.0),
            record("u2", "Beta", "Fiction", 20.0),
        ],
    );

    let (status, body) = get(&app, "/api/v1/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let id = body.as_array().unwrap()[0]["id"].as_i64().unwrap();
    let (status, book) = get(&app, &format!("/api/v1/books/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["title"], "Alpha");

    let (status, _) = get(&app, "/api/v1/books/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_store_yields_404_listing() {
    let (_dir, app) = test_app("http://unused.example", &[]);

    let (status, _) = get(&app, "/api/v1/books").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/v1/categories").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_by_title_and_category() {
    let (_dir, app) = test_app(
        "http://unused.example",
        &[
            record("u1", "Walking the Alps", "Travel", 10.0),
            record("u2", "City Nights", "Fiction", 20.0),
        ],
    );

    let (status, body) = get(&app, "/api/v1/books/search?category=Trav").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body.as_array().unwrap()[0]["title"], "Walking the Alps");

    let (status, body) = get(&app, "/api/v1/books/search?title=Nights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["category"], "Fiction");

    let (status, _) = get(&app, "/api/v1/books/search?title=Nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_categories_and_stats() {
    let (_dir, app) = test_app(
        "http://unused.example",
        &[
            record("u1", "Alpha", "Travel", 10.0),
            record("u2", "Beta", "Travel", 30.0),
            record("u3", "Gamma", "Fiction", 20.0),
        ],
    );

    let (status, body) = get(&app, "/api/v1/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Fiction", "Travel"]));

    let (status, body) = get(&app, "/api/v1/stats/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 3);
    assert_eq!(body["total_categories"], 2);
    assert_eq!(body["average_price"], 20.0);

    let (status, body) = get(&app, "/api/v1/stats/categories").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["category"], "Travel");
    assert_eq!(entries[1]["book_count"], 2);
}

#[tokio::test]
async fn test_auth_flow_register_login_refresh() {
    let (_dir, app) = test_app("http://unused.example", &[]);
    let token = login_token(&app).await;

    let (status, body) = post_json(&app, "/api/v1/auth/refresh", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some());

    // Duplicate registration is rejected
    let (status, _) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({"username": "admin", "password": "other"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Wrong password is rejected
    let (status, _) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "admin", "password": "wrong"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trigger_requires_token() {
    let (_dir, app) = test_app("http://unused.example", &[]);

    let (status, _) = post_json(&app, "/api/v1/ingest/trigger", json!({}), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json(
        &app,
        "/api/v1/ingest/trigger",
        json!({}),
        Some("admin:9999999999:forged"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trigger_runs_ingest_and_reports() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="side_categories"><ul class="nav">
               <li><a href="catalogue/category/books_1/index.html">Books</a><ul>
               <li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li>
               </ul></li></ul></div></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><article class="product_pod">
               <img src="../media/one.jpg">
               <p class="star-rating Five"></p>
               <h3><a href="../../../only-book_1/index.html" title="Only Book">Only Book</a></h3>
               <p class="price_color">£9.99</p>
               <p class="instock availability">In stock</p>
               </article></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (_dir, app) = test_app(&server.uri(), &[]);
    let token = login_token(&app).await;

    let (status, report) = post_json(&app, "/api/v1/ingest/trigger", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["discovered"], 1);
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["failed_categories"], json!([]));

    // The collected book is immediately queryable
    let (status, body) = get(&app, "/api/v1/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["title"], "Only Book");
    assert_eq!(body.as_array().unwrap()[0]["rating"], 5);
}
