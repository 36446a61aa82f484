//! Form validation
//!
//! - **registration**: Bed, spa, and dining reservation forms
//! - **account**: Sign-up and login forms
//! - **error**: Per-field error map

pub mod account;
pub mod error;
pub mod registration;

pub use account::{is_valid_email, normalize_email, LoginForm, SignUpForm, ValidSignUp};
pub use error::{FieldErrors, ValidationError, ValidationResult, REQUIRED_FIELDS_MESSAGE};
pub use registration::{
    BedRegistration, DateRange, DiningRegistration, Registration, RegistrationKind,
    SpaRegistration,
};
