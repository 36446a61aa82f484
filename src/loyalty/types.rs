//! Core data types for the Kuriftu Rewards loyalty domain
//!
//! This module defines the records shared by every layer:
//! - `Booking`: A hotel stay reservation
//! - `PointTransaction`: A signed ledger entry
//! - `MembershipTier` and `TierLevel`: Loyalty levels
//! - `PaymentMethod` and `PaymentTransaction`: Stored cards and charges
//! - `Experience`, `Offer`: Recommendation catalog entries
//!
//! All records serialize with camelCase field names so the JSON matches
//! what the portal pages consume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::LoyaltyError;

// ============================================
// BOOKINGS
// ============================================

/// Lifecycle state of a booking as shown in the portal tabs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Stay has not happened yet
    Upcoming,
    /// Stay is completed
    Past,
    /// Booking was cancelled
    Cancelled,
}

impl BookingStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [BookingStatus] {
        &[
            BookingStatus::Upcoming,
            BookingStatus::Past,
            BookingStatus::Cancelled,
        ]
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Upcoming => write!(f, "upcoming"),
            BookingStatus::Past => write!(f, "past"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(BookingStatus::Upcoming),
            "past" => Ok(BookingStatus::Past),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(LoyaltyError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A hotel stay reservation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub hotel: String,
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub room_type: String,
    /// Free-text party description, e.g. "2 Adults, 1 Child"
    pub guests: String,
    pub status: BookingStatus,
    pub confirmation_number: String,
    /// Total price in cents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i64>,
    /// Points spent when the stay was paid with points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_redeemed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Booking {
    /// Number of nights between check-in and check-out
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }
}

// ============================================
// POINT LEDGER
// ============================================

/// Direction of a point transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earn,
    Redeem,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Earn => write!(f, "earn"),
            TransactionType::Redeem => write!(f, "redeem"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "earn" => Ok(TransactionType::Earn),
            "redeem" => Ok(TransactionType::Redeem),
            other => Err(LoyaltyError::UnknownValue {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// A signed ledger entry: earn entries are positive, redeem entries negative
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Signed point delta
    pub points: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl PointTransaction {
    /// Create an earn entry; the delta is stored as a positive value
    pub fn earn(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        points: i64,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            points: points.abs(),
            kind: TransactionType::Earn,
        }
    }

    /// Create a redeem entry; the delta is stored as a negative value
    pub fn redeem(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        points: i64,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            points: -points.abs(),
            kind: TransactionType::Redeem,
        }
    }
}

// ============================================
// MEMBERSHIP
// ============================================

/// Ordered loyalty levels, lowest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TierLevel {
    Explorer,
    Voyager,
    Adventurer,
    Connoisseur,
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierLevel::Explorer => write!(f, "Explorer"),
            TierLevel::Voyager => write!(f, "Voyager"),
            TierLevel::Adventurer => write!(f, "Adventurer"),
            TierLevel::Connoisseur => write!(f, "Connoisseur"),
        }
    }
}

impl FromStr for TierLevel {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "explorer" => Ok(TierLevel::Explorer),
            "voyager" => Ok(TierLevel::Voyager),
            "adventurer" => Ok(TierLevel::Adventurer),
            "connoisseur" => Ok(TierLevel::Connoisseur),
            other => Err(LoyaltyError::UnknownValue {
                field: "tier",
                value: other.to_string(),
            }),
        }
    }
}

/// A named loyalty level with its multiplier and benefits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTier {
    pub level: TierLevel,
    pub name: String,
    pub description: String,
    pub qualification: String,
    /// Display label, e.g. "1.25x"
    pub points_multiplier: String,
    pub features: Vec<String>,
    pub special_perks: Vec<String>,
    pub color: String,
    pub text_color: String,
    #[serde(default)]
    pub featured: bool,
}

/// A member's current standing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub tier: MembershipTier,
    pub points: i64,
    pub next_tier: Option<MembershipTier>,
    pub points_to_next_tier: Option<i64>,
    pub member_since: NaiveDate,
    pub progress_percentage: f64,
    pub stays_this_year: u32,
}

// ============================================
// PAYMENTS
// ============================================

/// Card funding type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Credit,
    Debit,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Credit => write!(f, "credit"),
            CardKind::Debit => write!(f, "debit"),
        }
    }
}

/// Card network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Other,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardBrand::Visa => write!(f, "Visa"),
            CardBrand::Mastercard => write!(f, "Mastercard"),
            CardBrand::Amex => write!(f, "Amex"),
            CardBrand::Discover => write!(f, "Discover"),
            CardBrand::Other => write!(f, "Card"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A stored card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub card_brand: CardBrand,
    pub last_four: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cardholder_name: String,
    #[serde(default)]
    pub is_default: bool,
    pub billing_address: BillingAddress,
}

/// Settlement state of a charge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(PaymentStatus::Completed),
            "pending" => Ok(PaymentStatus::Pending),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(LoyaltyError::UnknownValue {
                field: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

/// A charge against one of the member's cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Amount in cents
    pub amount_cents: i64,
    pub status: PaymentStatus,
    /// Display label of the card used, e.g. "Visa •••• 4242"
    pub payment_method: String,
}

// ============================================
// RECOMMENDATIONS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOption {
    pub name: String,
    pub points: i64,
    /// Value in cents
    pub value_cents: i64,
}

/// A bookable experience that earns or redeems points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub description: String,
    pub earn_rate: String,
    pub redemption_options: Vec<RedemptionOption>,
    pub image: String,
}

/// A time-limited promotional offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub discount: String,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendations {
    pub experiences: Vec<Experience>,
    pub offers: Vec<Offer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_sign_convention() {
        let earn = PointTransaction::earn("tx-1", date(2023, 10, 15), "Stay", -5000);
        assert_eq!(earn.points, 5000);
        assert_eq!(earn.kind, TransactionType::Earn);

        let redeem = PointTransaction::redeem("tx-2", date(2023, 8, 30), "Upgrade", 10_000);
        assert_eq!(redeem.points, -10_000);
        assert_eq!(redeem.kind, TransactionType::Redeem);
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = PointTransaction::earn("tx-1", date(2023, 10, 15), "Stay", 5000);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "earn");
        assert_eq!(json["date"], "2023-10-15");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Upcoming".parse::<BookingStatus>().unwrap(), BookingStatus::Upcoming);
        assert_eq!("cancelled".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
        assert!("pending".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_tier_level_ordering() {
        assert!(TierLevel::Explorer < TierLevel::Voyager);
        assert!(TierLevel::Adventurer < TierLevel::Connoisseur);
        assert_eq!("voyager".parse::<TierLevel>().unwrap(), TierLevel::Voyager);
    }

    #[test]
    fn test_booking_nights() {
        let booking = Booking {
            id: "booking-1".to_string(),
            hotel: "Kuriftu Resort Bishoftu".to_string(),
            location: "Bishoftu, Ethiopia".to_string(),
            check_in: date(2023, 5, 15),
            check_out: date(2023, 5, 18),
            room_type: "Lake View Suite".to_string(),
            guests: "2 Adults".to_string(),
            status: BookingStatus::Upcoming,
            confirmation_number: "KR12345".to_string(),
            price_cents: Some(75_000),
            points_earned: None,
            points_redeemed: None,
            image: None,
        };
        assert_eq!(booking.nights(), 3);

        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["confirmationNumber"], "KR12345");
        assert!(json.get("pointsEarned").is_none());
    }
}
