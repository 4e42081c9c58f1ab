pub mod research;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", research::routes())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "sillage"}))
}
