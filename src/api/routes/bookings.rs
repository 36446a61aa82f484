//! Booking Routes
//!
//! - GET /api/v1/bookings - Bookings split into upcoming, past and cancelled
//! - POST /api/v1/bookings - Book a stay
//! - POST /api/v1/bookings/:id/cancel - Cancel an upcoming stay
//!
//! Booking toasts are addressed to the member who booked.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::BookingParams;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::loyalty::{Booking, BookingViews};
use crate::notify::ToastKind;
use crate::rewards::{StayConfirmation, StayRequest};

/// GET /api/v1/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<BookingParams>,
) -> ApiResult<Json<BookingViews>> {
    let filter = params.to_filter()?;
    let views = state
        .blocking(move |s| Ok(s.rewards.bookings(&current.user.id, &filter)?))
        .await?;
    Ok(Json(views))
}

/// POST /api/v1/bookings
///
/// Card payment earns points at the tier multiplier; `usePoints` redeems
/// the cost instead.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(request): Json<StayRequest>,
) -> ApiResult<(StatusCode, Json<StayConfirmation>)> {
    let user_id = current.user.id.clone();
    let hotel = request.hotel.clone();
    let confirmation = state
        .blocking(move |s| Ok(s.rewards.book_stay(&user_id, &request, s.today())?))
        .await?;

    state
        .toasts
        .toast_for(
            Some(&current.user.id),
            "Booking confirmed",
            format!(
                "Confirmation {} at {}",
                confirmation.confirmation_number, hotel
            ),
            ToastKind::Success,
        )
        .await;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// POST /api/v1/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .blocking(move |s| Ok(s.rewards.cancel_booking(&current.user.id, &id, s.today())?))
        .await?;
    Ok(Json(booking))
}
