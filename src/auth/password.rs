//! Salted password digests

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::store::Credential;

/// Derive a credential with a fresh random salt
pub fn hash_password(password: &str) -> Credential {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = digest(&salt, password);
    Credential { salt, digest }
}

pub fn verify_password(credential: &Credential, password: &str) -> bool {
    constant_time_eq(
        digest(&credential.salt, password).as_bytes(),
        credential.digest.as_bytes(),
    )
}

/// Credential checked when no account matches the email
///
/// Unknown and known accounts both pay for one digest on a failed login.
pub fn unknown_account() -> Credential {
    Credential {
        salt: "0".repeat(32),
        digest: "0".repeat(64),
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let cred = hash_password("secret1");
        assert_eq!(cred.digest.len(), 64);
        assert!(verify_password(&cred, "secret1"));
        assert!(!verify_password(&cred, "secret2"));
    }

    #[test]
    fn test_unknown_account_never_verifies() {
        let cred = unknown_account();
        assert_eq!(cred.digest.len(), 64);
        assert!(!verify_password(&cred, ""));
        assert!(!verify_password(&cred, "secret1"));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("secret1");
        let b = hash_password("secret1");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.digest, b.digest);
    }
}
