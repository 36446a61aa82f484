//! Persistence
//!
//! - **sqlite**: Document store over a single SQLite connection
//! - **records**: Account, session, and registration records
//! - **error**: Error types

pub mod error;
pub mod records;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use records::{Credential, Session, StoredRegistration, UserProfile};
pub use sqlite::{Redemption, Store, StoreStats, DB_FILE};
