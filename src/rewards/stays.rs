//! Stay booking requests and rate card

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forms::registration::{MAX_BED_GUESTS, ROOM_TYPES};
use crate::forms::{FieldErrors, ValidationError, ValidationResult};
use crate::loyalty::tiers::BASE_POINTS_PER_UNIT;

/// Resorts that accept stay bookings: (hotel, location)
pub const RESORTS: &[(&str, &str)] = &[
    ("Kuriftu Resort Bishoftu", "Bishoftu, Ethiopia"),
    ("Kuriftu Resort Bahir Dar", "Bahir Dar, Ethiopia"),
    ("Kuriftu Resort Lake Tana", "Lake Tana, Ethiopia"),
    ("Kuriftu Resort Awash Falls", "Awash, Ethiopia"),
    ("Kuriftu Resort Entoto", "Addis Ababa, Ethiopia"),
];

/// Nightly rate in cents for a room type
pub fn nightly_rate_cents(room_type: &str) -> Option<i64> {
    match room_type {
        "standard" => Some(15_000),
        "deluxe" => Some(25_000),
        "suite" => Some(40_000),
        "presidential" => Some(80_000),
        _ => None,
    }
}

/// Display name stored on the booking
pub fn room_label(room_type: &str) -> &'static str {
    match room_type {
        "standard" => "Standard Room",
        "deluxe" => "Deluxe Room",
        "suite" => "Suite",
        "presidential" => "Presidential Suite",
        _ => "Room",
    }
}

/// Points needed to pay a cost in cents outright
pub fn points_for_cost(cost_cents: i64) -> i64 {
    cost_cents.max(0) * BASE_POINTS_PER_UNIT / 100
}

fn default_hotel() -> String {
    RESORTS[0].0.to_string()
}

fn default_guests() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StayRequest {
    #[serde(default = "default_hotel")]
    pub hotel: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub room_type: String,
    #[serde(default = "default_guests")]
    pub guests: u8,
    #[serde(default)]
    pub use_points: bool,
}

impl StayRequest {
    /// Validated request: returns the resort location and total cost in cents
    pub fn validate(&self, today: NaiveDate) -> ValidationResult<(&'static str, i64)> {
        let mut errors = FieldErrors::new();

        let location = RESORTS
            .iter()
            .find(|(hotel, _)| *hotel == self.hotel)
            .map(|(_, location)| *location);
        if location.is_none() {
            errors.add("hotel", format!("Unknown resort: {}", self.hotel));
        }
        if self.check_in < today {
            errors.add("checkIn", "Check-in cannot be in the past");
        }
        if self.check_out <= self.check_in {
            errors.add("checkOut", "Check-out must be after check-in");
        }
        let rate = nightly_rate_cents(&self.room_type);
        if rate.is_none() {
            errors.add(
                "roomType",
                format!(
                    "Room type must be one of: {}",
                    ROOM_TYPES.join(", ")
                ),
            );
        }
        if self.guests == 0 || self.guests > MAX_BED_GUESTS {
            errors.add(
                "guests",
                format!("Number of guests must be between 1 and {}", MAX_BED_GUESTS),
            );
        }

        match (location, rate) {
            (Some(location), Some(rate)) if errors.is_empty() => {
                Ok((location, rate * self.nights()))
            }
            _ => {
                let message = errors
                    .iter()
                    .next()
                    .map(|(_, m)| m.to_string())
                    .unwrap_or_default();
                Err(ValidationError::new(message, errors))
            }
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }

    /// Party description stored on the booking
    pub fn guests_label(&self) -> String {
        match self.guests {
            1 => "1 Adult".to_string(),
            n if n >= MAX_BED_GUESTS => format!("{}+ Adults", MAX_BED_GUESTS),
            n => format!("{} Adults", n),
        }
    }
}

/// Result of a successful stay booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StayConfirmation {
    pub booking_id: String,
    pub confirmation_number: String,
    pub points_earned: i64,
    /// Points spent when paying with points
    pub points_redeemed: i64,
    /// Total cost in cents
    pub total_cost_cents: i64,
    pub upgrades: Vec<String>,
}
