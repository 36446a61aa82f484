//! Booking filters and lifecycle rules

use serde::Serialize;

use super::error::{LoyaltyError, LoyaltyResult};
use super::types::{Booking, BookingStatus};

/// Search, status, and location filter for the bookings page
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Matched case-insensitively against hotel name and confirmation number
    pub search: String,
    /// `None` keeps every status
    pub status: Option<BookingStatus>,
    /// Substring of the location; `None` keeps every location
    pub location: Option<String>,
}

impl BookingFilter {
    /// Build a filter from raw query values, where "all" or empty means no filter
    pub fn from_params(
        search: Option<&str>,
        status: Option<&str>,
        location: Option<&str>,
    ) -> LoyaltyResult<Self> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse()?),
        };

        let location = match location.map(str::trim) {
            None | Some("") => None,
            Some(l) if l.eq_ignore_ascii_case("all") => None,
            Some(l) => Some(l.to_string()),
        };

        Ok(Self {
            search: search.unwrap_or_default().trim().to_string(),
            status,
            location,
        })
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = term.is_empty()
            || booking.hotel.to_lowercase().contains(&term)
            || booking.confirmation_number.to_lowercase().contains(&term);
        let matches_status = self.status.map_or(true, |s| booking.status == s);
        let matches_location = self
            .location
            .as_deref()
            .map_or(true, |l| booking.location.contains(l));

        matches_search && matches_status && matches_location
    }

    /// Apply the filter, preserving input order
    pub fn apply(&self, bookings: &[Booking]) -> Vec<Booking> {
        bookings
            .iter()
            .filter(|b| self.matches(b))
            .cloned()
            .collect()
    }
}

/// Bookings split into the three portal tabs
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingViews {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
    pub cancelled: Vec<Booking>,
}

impl BookingViews {
    pub fn partition(bookings: Vec<Booking>) -> Self {
        let mut views = BookingViews::default();
        for booking in bookings {
            match booking.status {
                BookingStatus::Upcoming => views.upcoming.push(booking),
                BookingStatus::Past => views.past.push(booking),
                BookingStatus::Cancelled => views.cancelled.push(booking),
            }
        }
        views
    }

    pub fn total(&self) -> usize {
        self.upcoming.len() + self.past.len() + self.cancelled.len()
    }
}

/// Cancel an upcoming booking. Past or already cancelled bookings are rejected.
pub fn cancel(booking: &mut Booking) -> LoyaltyResult<()> {
    if booking.status != BookingStatus::Upcoming {
        return Err(LoyaltyError::NotCancellable {
            id: booking.id.clone(),
            status: booking.status,
        });
    }
    booking.status = BookingStatus::Cancelled;
    Ok(())
}

/// Generate a confirmation number in the `KR12345` format
pub fn confirmation_number() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 100_000;
    format!("KR{:05}", n)
}
