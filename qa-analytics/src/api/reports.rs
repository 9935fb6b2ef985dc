//! Report listing endpoints: sprint options and the per-environment table

use axum::{
    extract::{Query, State},
    Json,
};
use qa_common::Environment;
use serde::Deserialize;
use tracing::info;

use crate::engine::{self, ReportTableRow, SprintOption};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub env: Option<String>,
}

/// GET /api/v1/sprints
pub async fn sprints(State(state): State<AppState>) -> ApiResult<Json<Vec<SprintOption>>> {
    let options = engine::list_sprints(state.store.as_ref()).await?;
    Ok(Json(options))
}

/// GET /api/v1/reports/table?env=
///
/// `env` is required and matched case-insensitively.
pub async fn report_table(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> ApiResult<Json<Vec<ReportTableRow>>> {
    let env = params
        .env
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing environment query param".to_string()))?;

    let environment: Environment = env
        .parse()
        .map_err(|value| ApiError::BadRequest(format!("Unknown environment: {}", value)))?;

    let rows = engine::reports_for_environment(state.store.as_ref(), environment).await?;
    info!(environment = %environment, reports = rows.len(), "Report table fetched");

    Ok(Json(rows))
}
