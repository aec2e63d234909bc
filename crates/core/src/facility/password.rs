//! bcrypt password hashes.
//!
//! Stored in the modular crypt format (`$2b$<cost>$<salt+digest>`) so the
//! cost travels with the stored value.

use thiserror::Error;

/// Work factor for newly generated hashes.
pub const COST: u32 = 12;

/// Stored hashes above this cost are refused instead of verified.
const MAX_VERIFY_COST: u32 = 16;

/// Hashing could not run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self(err.to_string())
    }
}

/// Stored form of a user's password. The plaintext is never kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes `password` under a fresh random salt at [`COST`].
    pub fn generate(password: &str) -> Result<Self, PasswordError> {
        Self::with_cost(password, COST)
    }

    /// Hashes `password` at an explicit cost (4 to 31).
    pub fn with_cost(password: &str, cost: u32) -> Result<Self, PasswordError> {
        Ok(Self(bcrypt::hash(password, cost)?))
    }

    /// Wraps a value read back from the store.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when `password` matches this hash.
    ///
    /// A malformed stored value never verifies, nor does one whose cost is
    /// above what this service generates.
    pub fn verify(&self, password: &str) -> bool {
        match self.0.parse::<bcrypt::HashParts>() {
            Ok(parts) if parts.get_cost() <= MAX_VERIFY_COST => {
                bcrypt::verify(password, &self.0).unwrap_or(false)
            }
            _ => false,
        }
    }
}
