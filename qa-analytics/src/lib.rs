//! qa-analytics library - QA report analytics service
//!
//! Aggregates stored QA test-execution reports into developer pass/fail
//! charts, environment summaries, sprint error rates and release status
//! listings, served over a read-only JSON API.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod engine;
pub mod error;
pub mod pagination;
pub mod store;

pub use error::{ApiError, ApiResult};
use store::ReportStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let analytics = Router::new()
        .route("/api/v1/analytics/donut", get(api::donut_chart))
        .route("/api/v1/summary", get(api::summary))
        .route("/api/v1/sprint-error-comparison", get(api::sprint_error_comparison))
        .route("/api/v1/releases", get(api::releases))
        .route("/api/v1/sprints", get(api::sprints))
        .route("/api/v1/reports/table", get(api::report_table));

    Router::new()
        .merge(analytics)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
