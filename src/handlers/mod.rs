pub mod analyze;
pub mod dashboard;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(dashboard::index))
        // API (JSON with embedded charts)
        .route("/api/analyze", post(analyze::analyze))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
