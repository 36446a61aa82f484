//! Settings Routes
//!
//! - GET /api/v1/settings - Saved preferences, or defaults
//! - PUT /api/v1/settings - Replace preferences

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::loyalty::Preferences;

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Preferences>> {
    let prefs = state
        .blocking(move |s| Ok(s.rewards.preferences(&current.user.id)?))
        .await?;
    Ok(Json(prefs))
}

/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(prefs): Json<Preferences>,
) -> ApiResult<Json<Preferences>> {
    state
        .blocking(move |s| {
            s.rewards.update_preferences(&current.user.id, &prefs)?;
            Ok(prefs)
        })
        .await
        .map(Json)
}
