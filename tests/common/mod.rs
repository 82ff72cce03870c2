//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the application router
//! against an in-memory database seeded through the `insert_*` helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rusqlite::params;
use salesdash::config::Config;
use salesdash::db::{create_in_memory_pool, migrations, DbPool};
use salesdash::handlers;
use salesdash::server;
use salesdash::state::AppState;
use std::path::{Path, PathBuf};
use tower::ServiceExt;

/// A test client that sends requests to a fresh application instance.
pub struct TestClient {
    pool: DbPool,
    state: AppState,
}

impl TestClient {
    /// Create a new test client with a fresh, migrated in-memory database.
    pub fn new() -> Self {
        Self::with_config(Self::test_config())
    }

    /// Create a test client with a specific configuration; the database is
    /// always in-memory.
    pub fn with_config(config: Config) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }
        Self::with_pool(pool, config)
    }

    /// Create a test client over an existing pool, migrated or not.
    pub fn with_pool(pool: DbPool, config: Config) -> Self {
        let state = server::build_state(pool.clone(), config);
        Self { pool, state }
    }

    pub fn test_config() -> Config {
        Config {
            port: 7070,
            database_path: PathBuf::from(":memory:"),
            ..Config::default()
        }
    }

    /// Get the router for making requests.
    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST a raw body as `application/json` and return status and body.
    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a JSON value and parse the JSON response.
    pub async fn post_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.post_raw(uri, &body.to_string()).await;
        let parsed = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"));
        (status, parsed)
    }

    /// Request one analysis over a date range.
    pub async fn analyze(
        &self,
        analysis_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> (StatusCode, serde_json::Value) {
        self.post_json(
            "/api/analyze",
            &serde_json::json!({
                "start_date": start_date,
                "end_date": end_date,
                "analysis_type": analysis_type,
            }),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    // =========================================================================
    // Helper methods for seeding the store
    // =========================================================================

    /// Insert one sales-detail row.
    pub fn insert_sales_detail(
        &self,
        date: &str,
        member: &str,
        store: &str,
        product: &str,
        sale_amount: f64,
        performance_amount: f64,
        status: &str,
    ) {
        let conn = self.pool.get().unwrap();
        conn.execute(
            "INSERT INTO product_order_sales_return_details
             (doc_date, member_name, store_name, product_name, sale_amount, performance_amount, doc_status)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![date, member, store, product, sale_amount, performance_amount, status],
        )
        .unwrap();
    }

    /// Insert one order row.
    pub fn insert_order(&self, date: &str, member: &str, store: &str, paid: f64, status: &str) {
        let conn = self.pool.get().unwrap();
        conn.execute(
            "INSERT INTO product_order (doc_date, member_name, store_name, paid_amount, doc_status)
             VALUES (?, ?, ?, ?, ?)",
            params![date, member, store, paid, status],
        )
        .unwrap();
    }

    /// Seed a small two-month data set across three dealers.
    pub fn seed_sample_data(&self) {
        self.insert_order("2024-01-05", "王五", "A店", 30000.0, "订单完结");
        self.insert_order("2024-01-10", "王五", "B店", 20000.0, "开始送货");
        self.insert_order("2024-02-03", "赵六", "B店", 50000.0, "拆单");
        self.insert_order("2024-02-15", "赵六", "C店", 10000.0, "订单完结");
        // Not counted: excluded member and status
        self.insert_order("2024-02-20", "陈思", "A店", 999999.0, "订单完结");
        self.insert_order("2024-02-21", "王五", "C店", 888888.0, "草稿");

        self.insert_sales_detail("2024-01-05", "王五", "A店", "海德丰 1L", 12000.0, 10000.0, "完结");
        self.insert_sales_detail("2024-01-08", "王五", "A店", "大美收（20-20-20+TE）", 8000.0, 7000.0, "完结");
        self.insert_sales_detail("2024-02-02", "赵六", "B店", "海德丰 5L", 15000.0, 13000.0, "已审核");
        self.insert_sales_detail("2024-02-09", "赵六", "C店", "极银双星套餐", 5000.0, 4000.0, "完结");
        // Uncategorized product is dropped
        self.insert_sales_detail("2024-02-10", "赵六", "C店", "未知产品ABC", 70000.0, 60000.0, "完结");
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
