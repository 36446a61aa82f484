//! Member accounts
//!
//! - **service**: Sign-up, sign-in, sessions, and auth state events
//! - **password**: Salted SHA-256 digests
//! - **error**: Error types

pub mod error;
pub mod password;
pub mod service;

pub use error::{AuthError, AuthResult, INVALID_CREDENTIALS};
pub use password::{hash_password, verify_password};
pub use service::{AuthConfig, AuthEvent, AuthService, AuthSession};
