//! Password hashing
//!
//! Argon2id hashing for both user account passwords and secure-note
//! passwords. Hashes are stored in PHC string format with a per-call
//! random salt, so equal inputs never produce equal hashes. Plaintext
//! passwords are never logged.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::{AppError, Result};

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns false on mismatch. A stored hash that fails to parse also
/// yields false (with a warning) rather than an error, so callers keep
/// a single opaque negative path.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw123456").unwrap();

        assert!(verify_password("pw123456", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let h1 = hash_password("same_password").unwrap();
        let h2 = hash_password("same_password").unwrap();

        assert_ne!(h1, h2);
        assert!(verify_password("same_password", &h1));
        assert!(verify_password("same_password", &h2));
    }

    #[test]
    fn test_case_sensitive() {
        let hash = hash_password("Secret1").unwrap();

        assert!(verify_password("Secret1", &hash));
        assert!(!verify_password("secret1", &hash));
    }

    #[test]
    fn test_malformed_hash_is_false_not_panic() {
        assert!(!verify_password("anything", "not-a-phc-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_unicode_password() {
        let hash = hash_password("пароль密码🔐").unwrap();

        assert!(verify_password("пароль密码🔐", &hash));
        assert!(!verify_password("password", &hash));
    }
}
