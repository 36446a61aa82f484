//! Store error types

use thiserror::Error;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite rejected a statement or could not open the database
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writes only go to the known registration collections
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A unique key (such as an account email) already exists
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Connection mutex was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::UnknownCollection("gym-registrations".to_string());
        assert_eq!(err.to_string(), "Unknown collection: gym-registrations");

        let err = StoreError::Duplicate("guest@kuriftu.com".to_string());
        assert_eq!(err.to_string(), "Already exists: guest@kuriftu.com");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
