//! Kuriftu Rewards Loyalty Domain
//!
//! Pure domain rules with no I/O:
//!
//! - **types**: Records (Booking, PointTransaction, MembershipTier, PaymentMethod, ...)
//! - **tiers**: Tier catalog, qualification, progress and earn arithmetic
//! - **ledger**: Point history filters, totals and CSV export
//! - **bookings**: Booking filters, tab partitioning and cancellation
//! - **payments**: Wallet with a single default card
//! - **preferences**: Account settings
//! - **seed**: Demo member data and recommendation catalog
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use kuriftu::loyalty::{progress_percentage, LedgerSummary, PointTransaction, TierLevel};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let history = vec![
//!     PointTransaction::earn("tx-1", today, "Stay", 5_000),
//!     PointTransaction::redeem("tx-2", today, "Spa", 1_200),
//! ];
//! let summary = LedgerSummary::from_transactions(&history);
//! assert_eq!(summary.balance, 3_800);
//!
//! let tier = TierLevel::for_stays(4);
//! assert_eq!(tier, TierLevel::Voyager);
//! assert!(progress_percentage(summary.balance, Some(6_200)) < 100.0);
//! ```

pub mod bookings;
pub mod error;
pub mod ledger;
pub mod payments;
pub mod preferences;
pub mod seed;
pub mod tiers;
pub mod types;

// Re-export commonly used types
pub use bookings::{BookingFilter, BookingViews};
pub use error::{LoyaltyError, LoyaltyResult};
pub use ledger::{DateWindow, LedgerFilter, LedgerSummary, TypeFilter};
pub use payments::Wallet;
pub use preferences::{
    AccessibilityPreferences, NotificationPreferences, Preferences, PrivacyPreferences,
};
pub use tiers::{catalog, points_for_spend, points_to_next_tier, progress_percentage};
pub use types::{
    BillingAddress, Booking, BookingStatus, CardBrand, CardKind, Experience, Membership,
    MembershipTier, Offer, PaymentMethod, PaymentStatus, PaymentTransaction, PointTransaction,
    Recommendations, RedemptionOption, TierLevel, TransactionType,
};
