//! Notification Routes
//!
//! Polling access to the toast queue; `/api/v1/ws` streams the same
//! snapshots. Signing in is optional: anonymous callers see public toasts,
//! members also see their own.
//!
//! - GET /api/v1/notifications - Toasts currently showing
//! - DELETE /api/v1/notifications/:id - Dismiss a toast

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::NotificationsResponse;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    current: Option<CurrentUser>,
) -> Json<NotificationsResponse> {
    let viewer = current.as_ref().map(|c| c.user.id.as_str());
    Json(NotificationsResponse {
        toasts: state.toasts.snapshot_for(viewer).await,
    })
}

/// DELETE /api/v1/notifications/:id
///
/// Another member's toast reads as not found.
pub async fn dismiss_notification(
    State(state): State<Arc<AppState>>,
    current: Option<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let viewer = current.as_ref().map(|c| c.user.id.as_str());
    state.toasts.dismiss_as(viewer, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
