//! Miscellaneous integration tests (health check, dashboard page, startup).

mod common;

use axum::http::StatusCode;
use common::TestClient;
use salesdash::config::Config;
use salesdash::error::AppError;
use salesdash::server;

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let client = TestClient::new();
    let (status, body) = client.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

/// Test the dashboard page lists every analysis type.
#[tokio::test]
async fn test_dashboard_page() {
    let client = TestClient::new();
    let (status, body) = client.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form id=\"analyze-form\">"));
    for id in [
        "overall_trend",
        "monthly_champion_dealer",
        "monthly_champion_product",
        "dealer_sales_details",
        "product_sales_details",
        "top_dealers_trend",
        "top_products_trend",
        "dealer_product_composition",
    ] {
        assert!(body.contains(&format!("value=\"{id}\"")), "{id}");
    }
}

/// Test the analysis route only accepts POST.
#[tokio::test]
async fn test_analyze_requires_post() {
    let client = TestClient::new();
    let (status, _) = client.get("/api/analyze").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

/// Test a file-backed app builds, migrates and serves requests.
#[tokio::test]
async fn test_build_app_with_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("nested/salesdash.db"),
        migrations_path: "migrations".into(),
        pool_size: 2,
        ..Config::default()
    };

    let (_state, app) = server::build_app(config).unwrap();
    let db_path = dir.path().join("nested/salesdash.db");
    assert!(db_path.exists());

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let applied: i64 = conn
        .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, 1);
    drop(conn);

    let (port, handle) = server::serve(app, "127.0.0.1", 0).await.unwrap();
    assert_ne!(port, 0);
    handle.abort();
}

/// Test a missing chart font file fails startup with an IO error.
#[tokio::test]
async fn test_build_app_with_missing_chart_font() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("salesdash.db"),
        chart_font: Some(dir.path().join("missing.ttf")),
        ..Config::default()
    };

    let result = server::build_app(config);
    assert!(matches!(result, Err(AppError::Io(_))));
}
