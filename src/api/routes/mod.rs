//! API Routes
//!
//! Route handlers organized by functionality.

pub mod auth;
pub mod bookings;
pub mod health;
pub mod membership;
pub mod notifications;
pub mod payments;
pub mod points;
pub mod registrations;
pub mod settings;
