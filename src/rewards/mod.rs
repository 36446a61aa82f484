//! Rewards portal service
//!
//! - **service**: Membership, bookings, ledger, wallet, settings, and forms
//!   over the store
//! - **stays**: Stay booking requests and the nightly rate card
//! - **error**: Error types

pub mod error;
pub mod service;
pub mod stays;

pub use error::{RewardsError, RewardsResult};
pub use service::{PointHistory, RewardsService, SeedSummary};
pub use stays::{StayConfirmation, StayRequest, RESORTS};
