//! Data Transfer Objects
//!
//! Request and response types for the API layer.
//! Domain records (Booking, PaymentMethod, Preferences, ...) serialize
//! directly; these types cover the envelopes and query strings around them.

use serde::{Deserialize, Serialize};

use crate::loyalty::{
    BookingFilter, DateWindow, LedgerFilter, LoyaltyResult, MembershipTier, PaymentMethod,
    PaymentTransaction, TypeFilter,
};
use crate::notify::Toast;

// ============================================
// AUTH DTOs
// ============================================

/// Response for logout
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    /// False when the token had no open session
    pub signed_out: bool,
}

// ============================================
// MEMBERSHIP DTOs
// ============================================

/// Tier catalog
#[derive(Debug, Serialize, Deserialize)]
pub struct TiersResponse {
    pub tiers: Vec<MembershipTier>,
}

// ============================================
// POINTS DTOs
// ============================================

/// Query parameters for the point history and its CSV export
#[derive(Debug, Default, Deserialize)]
pub struct PointsParams {
    /// Substring of the transaction description
    pub search: Option<String>,
    /// earn, redeem, or all
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// all-time, last-30-days, last-90-days, this-year
    pub range: Option<String>,
}

impl PointsParams {
    pub fn to_filter(&self, today: chrono::NaiveDate) -> LoyaltyResult<LedgerFilter> {
        let kind: TypeFilter = self.kind.as_deref().unwrap_or_default().trim().parse()?;
        let window: DateWindow = self.range.as_deref().unwrap_or_default().trim().parse()?;
        Ok(LedgerFilter::all(today)
            .search(self.search.as_deref().unwrap_or_default().trim())
            .kind(kind)
            .window(window))
    }
}

// ============================================
// BOOKING DTOs
// ============================================

/// Query parameters for the bookings page
#[derive(Debug, Default, Deserialize)]
pub struct BookingParams {
    pub search: Option<String>,
    /// upcoming, past, cancelled, or all
    pub status: Option<String>,
    pub location: Option<String>,
}

impl BookingParams {
    pub fn to_filter(&self) -> LoyaltyResult<BookingFilter> {
        BookingFilter::from_params(
            self.search.as_deref(),
            self.status.as_deref(),
            self.location.as_deref(),
        )
    }
}

// ============================================
// PAYMENT DTOs
// ============================================

/// Wallet contents after any change
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodsResponse {
    pub methods: Vec<PaymentMethod>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentTransactionsResponse {
    pub transactions: Vec<PaymentTransaction>,
}

// ============================================
// REGISTRATION DTOs
// ============================================

/// Response for a submitted registration form
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub collection: String,
    pub message: String,
}

// ============================================
// NOTIFICATION DTOs
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub toasts: Vec<Toast>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Store status
    pub store: String,
    /// Open notification streams
    pub listeners: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::{BookingStatus, TransactionType};
    use chrono::NaiveDate;

    #[test]
    fn test_points_params_to_filter() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let params = PointsParams {
            search: Some(" spa ".to_string()),
            kind: Some("redeem".to_string()),
            range: Some("last-90-days".to_string()),
        };
        let filter = params.to_filter(today).unwrap();
        assert_eq!(filter.search, "spa");
        assert_eq!(filter.kind, TypeFilter::Only(TransactionType::Redeem));
        assert_eq!(filter.window, DateWindow::Last90Days);

        let filter = PointsParams::default().to_filter(today).unwrap();
        assert_eq!(filter.kind, TypeFilter::All);
        assert_eq!(filter.window, DateWindow::AllTime);
    }

    #[test]
    fn test_points_params_reject_unknown_range() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let params = PointsParams {
            range: Some("forever".to_string()),
            ..Default::default()
        };
        assert!(params.to_filter(today).is_err());
    }

    #[test]
    fn test_booking_params_to_filter() {
        let params = BookingParams {
            search: None,
            status: Some("past".to_string()),
            location: Some("all".to_string()),
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.status, Some(BookingStatus::Past));
        assert!(filter.location.is_none());
    }
}
