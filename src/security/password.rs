//! Password hashing and verification using bcrypt.

use bcrypt::DEFAULT_COST;

use crate::error::{AppError, Result};

// bcrypt's supported cost range; anything outside falls back to the default.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Hash a password at the default cost (12).
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hash a password with an explicit cost factor. An out-of-range cost is
/// clamped to the default rather than rejected.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String> {
    let cost = if (MIN_COST..=MAX_COST).contains(&cost) {
        cost
    } else {
        DEFAULT_COST
    };

    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!("bcrypt hash failed: {}", e);
        AppError::Hashing
    })
}

/// Verify a password against a stored hash. A malformed hash counts as a
/// mismatch, not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
