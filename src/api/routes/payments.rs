//! Payment Routes
//!
//! Card wallet and charge history. Every wallet change returns the full
//! wallet so the client never has to reconcile the default flag itself.
//!
//! - GET /api/v1/payment-methods - List cards
//! - POST /api/v1/payment-methods - Add a card
//! - POST /api/v1/payment-methods/:id/default - Make a card the default
//! - DELETE /api/v1/payment-methods/:id - Remove a card
//! - GET /api/v1/payments/transactions - Charge history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PaymentMethodsResponse, PaymentTransactionsResponse};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::loyalty::PaymentMethod;

/// GET /api/v1/payment-methods
pub async fn list_payment_methods(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<PaymentMethodsResponse>> {
    let methods = state
        .blocking(move |s| Ok(s.rewards.payment_methods(&current.user.id)?))
        .await?;
    Ok(Json(PaymentMethodsResponse { methods }))
}

/// POST /api/v1/payment-methods
///
/// The first card added becomes the default.
pub async fn add_payment_method(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(method): Json<PaymentMethod>,
) -> ApiResult<(StatusCode, Json<PaymentMethodsResponse>)> {
    let methods = state
        .blocking(move |s| Ok(s.rewards.add_payment_method(&current.user.id, method)?))
        .await?;
    Ok((StatusCode::CREATED, Json(PaymentMethodsResponse { methods })))
}

/// POST /api/v1/payment-methods/:id/default
pub async fn set_default_payment_method(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentMethodsResponse>> {
    let methods = state
        .blocking(move |s| Ok(s.rewards.set_default_payment_method(&current.user.id, &id)?))
        .await?;
    Ok(Json(PaymentMethodsResponse { methods }))
}

/// DELETE /api/v1/payment-methods/:id
pub async fn remove_payment_method(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentMethodsResponse>> {
    let methods = state
        .blocking(move |s| Ok(s.rewards.remove_payment_method(&current.user.id, &id)?))
        .await?;
    Ok(Json(PaymentMethodsResponse { methods }))
}

/// GET /api/v1/payments/transactions
pub async fn list_payment_transactions(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<PaymentTransactionsResponse>> {
    let transactions = state
        .blocking(move |s| Ok(s.rewards.payment_transactions(&current.user.id)?))
        .await?;
    Ok(Json(PaymentTransactionsResponse { transactions }))
}
