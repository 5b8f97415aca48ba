//! Password hashing and verification.
//!
//! Passwords are stored as Argon2id PHC strings (`$argon2id$v=19$...`),
//! which embed the salt and parameters, so verification needs nothing but
//! the stored hash.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::ApiError;

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if the hasher rejects its parameters.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against a stored PHC hash.
///
/// A malformed stored hash never verifies.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
