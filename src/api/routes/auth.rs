//! Auth Routes
//!
//! Account creation and session management. Sessions are opaque bearer
//! tokens returned by signup and login.
//!
//! - POST /api/v1/auth/signup - Create an account and open a session
//! - POST /api/v1/auth/login - Open a session
//! - POST /api/v1/auth/logout - Close the current session
//! - GET /api/v1/auth/me - Profile of the signed-in member

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::LogoutResponse;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::auth::AuthSession;
use crate::forms::{LoginForm, SignUpForm};
use crate::store::UserProfile;

/// POST /api/v1/auth/signup
///
/// Validates the form, creates the account and signs the member in.
/// When demo seeding is enabled the new member also gets sample bookings,
/// points and cards.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignUpForm>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = state
        .blocking(move |s| {
            let session = s.auth.sign_up(&form)?;
            if s.config.seed_new_members {
                s.rewards.seed_demo_member(&session.user.id, s.today())?;
            }
            Ok(session)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> ApiResult<Json<AuthSession>> {
    let session = state
        .blocking(move |s| Ok(s.auth.sign_in(&form)?))
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<LogoutResponse>> {
    let signed_out = state
        .blocking(move |s| Ok(s.auth.sign_out(&current.token)?))
        .await?;
    Ok(Json(LogoutResponse { signed_out }))
}

/// GET /api/v1/auth/me
pub async fn me(current: CurrentUser) -> Json<UserProfile> {
    Json(current.user)
}
