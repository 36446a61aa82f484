//! Membership Routes
//!
//! - GET /api/v1/membership - Tier, balance and progress for the member
//! - GET /api/v1/tiers - Tier catalog
//! - GET /api/v1/recommendations - Experiences and current offers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::TiersResponse;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::loyalty::{catalog, Membership, Recommendations};

/// GET /api/v1/membership
///
/// Tier is derived from stays in the trailing year; points are the
/// ledger balance.
pub async fn get_membership(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Membership>> {
    let membership = state
        .blocking(move |s| Ok(s.rewards.user_membership(&current.user, s.today())?))
        .await?;
    Ok(Json(membership))
}

/// GET /api/v1/tiers
pub async fn list_tiers() -> Json<TiersResponse> {
    Json(TiersResponse { tiers: catalog() })
}

/// GET /api/v1/recommendations
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
) -> Json<Recommendations> {
    Json(state.rewards.recommendations(state.today()))
}
