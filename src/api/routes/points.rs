//! Points Routes
//!
//! Point history with search, type and date filters.
//!
//! - GET /api/v1/points - Filtered ledger with totals
//! - GET /api/v1/points/export - Filtered ledger as CSV

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::PointsParams;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::rewards::PointHistory;

/// GET /api/v1/points
///
/// Totals cover the filtered slice; `balance` covers the whole ledger.
pub async fn list_points(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<PointsParams>,
) -> ApiResult<Json<PointHistory>> {
    let filter = params.to_filter(state.today())?;
    let history = state
        .blocking(move |s| Ok(s.rewards.point_history(&current.user.id, &filter)?))
        .await?;
    Ok(Json(history))
}

/// GET /api/v1/points/export
pub async fn export_points(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<PointsParams>,
) -> ApiResult<Response> {
    let today = state.today();
    let filter = params.to_filter(today)?;
    let user_id = current.user.id.clone();
    let body = state
        .blocking(move |s| Ok(s.rewards.export_points(&user_id, &filter)?))
        .await?;

    let filename = format!("kuriftu_points_{}.csv", today.format("%Y%m%d"));

    tracing::info!(
        user_id = %current.user.id,
        bytes = body.len(),
        "Exported point history"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
