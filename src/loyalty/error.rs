//! Loyalty domain error types

use thiserror::Error;

use super::types::BookingStatus;

/// Errors raised by the loyalty domain rules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoyaltyError {
    /// A filter or enum value could not be parsed
    #[error("Unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    /// Booking cannot move to cancelled from its current state
    #[error("Booking {id} cannot be cancelled (status: {status})")]
    NotCancellable { id: String, status: BookingStatus },

    /// Payment method id is not in the wallet
    #[error("Payment method not found: {0}")]
    PaymentMethodNotFound(String),

    /// Payment method fields are malformed
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// Redemption exceeds the available balance
    #[error("Insufficient points: {needed} needed, {available} available")]
    InsufficientPoints { needed: i64, available: i64 },

    /// CSV export failed
    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for LoyaltyError {
    fn from(err: csv::Error) -> Self {
        LoyaltyError::Export(err.to_string())
    }
}

/// Result type alias for loyalty operations
pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoyaltyError::InsufficientPoints {
            needed: 12_000,
            available: 5_750,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient points: 12000 needed, 5750 available"
        );

        let err = LoyaltyError::NotCancellable {
            id: "booking-3".to_string(),
            status: BookingStatus::Past,
        };
        assert_eq!(
            err.to_string(),
            "Booking booking-3 cannot be cancelled (status: past)"
        );
    }
}
