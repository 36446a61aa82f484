//! Rewards service error types

use thiserror::Error;

use crate::forms::ValidationError;
use crate::loyalty::LoyaltyError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A domain rule rejected the operation
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for rewards operations
pub type RewardsResult<T> = Result<T, RewardsError>;
