//! # Kuriftu Rewards
//!
//! Loyalty portal backend for the Kuriftu resorts: accounts, membership
//! tiers, point history, stay bookings, card wallet, settings, and the bed,
//! spa and dining request forms.
//!
//! ## Features
//!
//! - **Tiered membership**: Tier from stays in the trailing year, points multiplier per tier
//! - **Point ledger**: Search, type and date filters with totals and CSV export
//! - **Bookings**: Upcoming, past and cancelled tabs; book and cancel stays
//! - **Persistence**: SQLite store for accounts, sessions and member records
//! - **Real-time**: Toast notifications streamed over WebSocket
//!
//! ## Modules
//!
//! - [`loyalty`]: Pure domain rules (tiers, ledger, bookings, wallet, settings)
//! - [`forms`]: Signup, login and registration form validation
//! - [`store`]: SQLite persistence
//! - [`auth`]: Accounts and bearer sessions
//! - [`notify`]: Toast queue with expiry
//! - [`rewards`]: Portal service over the store
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Live toast stream
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kuriftu::auth::{AuthConfig, AuthService};
//! use kuriftu::forms::SignUpForm;
//! use kuriftu::rewards::RewardsService;
//! use kuriftu::store::Store;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::in_memory()?);
//!     let auth = AuthService::new(Arc::clone(&store), AuthConfig::default());
//!     let rewards = RewardsService::new(Arc::clone(&store));
//!
//!     let session = auth.sign_up(&SignUpForm {
//!         full_name: "Abebe Kebede".to_string(),
//!         age: "34".to_string(),
//!         email: "abebe@example.com".to_string(),
//!         password: "secret123".to_string(),
//!     })?;
//!
//!     let today = chrono::Utc::now().date_naive();
//!     rewards.seed_demo_member(&session.user.id, today)?;
//!
//!     let membership = rewards.user_membership(&session.user, today)?;
//!     println!("{} with {} points", membership.tier.name, membership.points);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod loyalty;
pub mod notify;
pub mod rewards;
pub mod store;
pub mod websocket;

// Re-export top-level types for convenience
pub use loyalty::{
    Booking, BookingFilter, BookingStatus, BookingViews, LedgerFilter, LedgerSummary,
    LoyaltyError, Membership, MembershipTier, PaymentMethod, PointTransaction, Preferences,
    TierLevel, TransactionType,
};

pub use forms::{
    FieldErrors, LoginForm, Registration, RegistrationKind, SignUpForm, ValidationError,
};

pub use store::{Store, StoreError, StoreResult, UserProfile};

pub use auth::{AuthConfig, AuthError, AuthEvent, AuthService, AuthSession};

pub use notify::{Toast, ToastConfig, ToastHub, ToastKind};

pub use rewards::{RewardsError, RewardsService, StayConfirmation, StayRequest};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{websocket_handler, ClientMessage, ServerMessage};

pub use config::{Config, ConfigError, LoggingConfig};
