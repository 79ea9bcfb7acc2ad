//! Password hashing using Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$…`), which carry their
//! own salt and parameters.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::OnceLock;

use argon2::Argon2;
use rand::RngCore;

use crate::error::{Error, Result};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Plaintext behind the stand-in hash checked for unknown usernames.
const DUMMY_PASSWORD: &str = "notesbe-unknown-user";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| Error::Internal(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash.
///
/// A malformed stored hash is an internal error, not a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::Internal(format!("stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash with default parameters, built on first use.
fn dummy_hash() -> Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password(DUMMY_PASSWORD)?;
    Ok(DUMMY.get_or_init(|| hash))
}

/// Check a login attempt against the stored hash of the named user, if any.
///
/// An unknown user (`stored_hash == None`) is checked against a stand-in
/// hash and always fails, so both failure paths cost one Argon2 verification.
pub fn verify_credential(password: &str, stored_hash: Option<&str>) -> Result<bool> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, dummy_hash()?)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pw1"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let err = verify_password("pw", "plaintext-from-legacy-row").unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_unknown_user_never_verifies() {
        assert!(!verify_credential("pw", None).unwrap());
        assert!(!verify_credential(DUMMY_PASSWORD, None).unwrap());
    }

    #[test]
    fn test_dummy_hash_is_stable_argon2id() {
        let first = dummy_hash().unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_eq!(first, dummy_hash().unwrap());
    }

    #[test]
    fn test_known_user_checks_stored_hash() {
        let hash = hash_password("pw1").unwrap();
        assert!(verify_credential("pw1", Some(&hash)).unwrap());
        assert!(!verify_credential("pw2", Some(&hash)).unwrap());
    }
}
