//! Request extractors
//!
//! `CurrentUser` resolves the `Authorization: Bearer <token>` header to the
//! signed-in member. Handlers that take it reject anonymous requests with 401;
//! wrap it in `Option` where signing in is optional.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::auth::AuthError;
use crate::store::UserProfile;

/// The member behind the request's session token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: UserProfile,
}

/// Pull the token out of an Authorization header value
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthenticated)?
            .to_string();

        authenticate(state, token).await
    }
}

/// Resolve a session token to its member
pub async fn authenticate(state: &Arc<AppState>, token: String) -> Result<CurrentUser, ApiError> {
    state
        .blocking(move |s| {
            let user = s.auth.current_user(&token)?;
            Ok(CurrentUser { token, user })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("bearer   abc123 "), Some("abc123"));
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc123"), None);
    }
}
