//! Health, readiness and liveness endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Module name reported by /health
pub const MODULE_NAME: &str = "qa-analytics";

/// Health check response: status, module name, and version
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /ready
pub async fn readiness() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/ping", get(ping))
}
