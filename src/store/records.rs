//! Account and document records held by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Member profile document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub age: u32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Salted password digest, hex encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub salt: String,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A form submission as written to its collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredRegistration {
    pub id: String,
    pub collection: String,
    pub document: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
}
