//! Registration Routes
//!
//! Bed, spa and dining request forms. Signing in is optional; a signed-in
//! submission is tagged with the member id. Every outcome publishes a toast,
//! addressed to the member when there is one.
//!
//! - POST /api/v1/registrations/:kind - Submit a form (bed | spa | dining)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::RegistrationResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::forms::{Registration, RegistrationKind};
use crate::notify::ToastKind;
use crate::rewards::RewardsError;

/// POST /api/v1/registrations/:kind
pub async fn submit_registration(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    current: Option<CurrentUser>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let kind: RegistrationKind = kind
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Registration type {}", kind)))?;

    let owner = current.as_ref().map(|c| c.user.id.clone());
    let result = match Registration::from_json(kind, body) {
        Ok(registration) => {
            let user = current.map(|c| c.user);
            state
                .blocking(move |s| {
                    Ok(s.rewards.submit_registration(&registration, user.as_ref()))
                })
                .await?
        }
        Err(err) => Err(RewardsError::from(err)),
    };

    let toasts = &state.toasts;
    let owner = owner.as_deref();
    match result {
        Ok(id) => {
            let message = kind.success_message();
            toasts
                .toast_for(owner, "Success", message.clone(), ToastKind::Success)
                .await;
            Ok((
                StatusCode::CREATED,
                Json(RegistrationResponse {
                    id,
                    collection: kind.collection().to_string(),
                    message,
                }),
            ))
        }
        Err(RewardsError::Validation(err)) => {
            toasts
                .toast_for(owner, "Error", err.message.clone(), ToastKind::Error)
                .await;
            Err(err.into())
        }
        Err(err) => {
            tracing::warn!(kind = %kind, error = %err, "Registration failed");
            toasts
                .toast_for(owner, "Error", kind.failure_message(), ToastKind::Error)
                .await;
            Err(err.into())
        }
    }
}
