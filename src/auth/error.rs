//! Account service error types

use thiserror::Error;

use crate::forms::ValidationError;
use crate::store::StoreError;

/// Message returned for any failed login
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Error, Debug)]
pub enum AuthError {
    /// The submitted form failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An account with this email already exists")]
    EmailTaken,

    /// Unknown email and wrong password are indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for account operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), INVALID_CREDENTIALS);
        let err: AuthError = ValidationError::field("email", "Email is required").into();
        assert_eq!(err.to_string(), "Email is required");
    }
}
