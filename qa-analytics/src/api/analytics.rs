//! Analytics endpoints: developer chart, summary, sprint error rates, releases

use axum::{
    extract::{Query, State},
    Json,
};
use qa_common::time::DateWindow;
use serde::Deserialize;
use tracing::info;

use crate::engine::{
    self, DeveloperFilter, DonutChartRow, ReleaseEntry, SprintErrorRate, StatusFilter,
    SummaryFilter, SummaryResponse,
};
use crate::error::ApiResult;
use crate::pagination::ReleasePage;
use crate::AppState;

/// Query parameters for the developer chart; all optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutParams {
    pub sprint: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameters carrying a required date window
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub sprint: Option<String>,
}

/// Release listing parameters; kept as text so bad numbers fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct ReleaseParams {
    pub status: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/v1/analytics/donut
pub async fn donut_chart(
    State(state): State<AppState>,
    Query(params): Query<DonutParams>,
) -> ApiResult<Json<Vec<DonutChartRow>>> {
    let filter = DeveloperFilter::parse(
        params.sprint.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    );

    let rows = engine::developer_chart(state.store.as_ref(), &filter).await?;
    Ok(Json(rows))
}

/// GET /api/v1/summary
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let filter = SummaryFilter::parse(&params.start_date, &params.end_date, params.sprint.as_deref())?;

    info!(
        start = %params.start_date,
        end = %params.end_date,
        sprint = ?filter.sprint,
        "Summary requested"
    );

    Ok(Json(engine::summarize(state.store.as_ref(), &filter).await))
}

/// GET /api/v1/sprint-error-comparison
pub async fn sprint_error_comparison(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<Vec<SprintErrorRate>>> {
    let window = DateWindow::parse_full_days(&params.start_date, &params.end_date)?;

    let rates = engine::sprint_error_rates(state.store.as_ref(), window).await?;
    Ok(Json(rates))
}

/// GET /api/v1/releases
pub async fn releases(
    State(state): State<AppState>,
    Query(params): Query<ReleaseParams>,
) -> ApiResult<Json<Vec<ReleaseEntry>>> {
    let status = StatusFilter::parse(params.status.as_deref());
    let page = ReleasePage::parse(params.skip.as_deref(), params.limit.as_deref());

    let entries = engine::list_releases(state.store.as_ref(), status, page).await?;
    Ok(Json(entries))
}
