//! Password hashing and verification

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

use crate::error::{UserError, UserResult};

/// Hash a plaintext password with a fresh random salt
///
/// The output is a PHC string embedding algorithm, cost and salt, so two
/// calls with the same input never produce the same value.
pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| UserError::HashingFailed(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Check a plaintext password against a stored hash
///
/// A hash that cannot be parsed never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Failed to parse password hash: {}", e);
            false
        }
    }
}
