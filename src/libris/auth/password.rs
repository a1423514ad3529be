//! Password hashing for membership credentials.
//!
//! bcrypt with a fixed cost factor. Hashes are salted, so two hashes of the
//! same plaintext differ and must never be compared with string equality;
//! always go through [`verify`].

use anyhow::{Context, Result};

/// Fixed bcrypt work factor for all stored credentials.
pub const COST: u32 = 10;

/// Hash a plaintext password for storage.
///
/// # Errors
/// Returns an error if the hashing primitive fails.
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// The comparison inside bcrypt is constant-time.
///
/// # Errors
/// Returns an error if the stored hash cannot be parsed.
pub fn verify(plaintext: &str, hashed: &str) -> Result<bool> {
    bcrypt::verify(plaintext, hashed).context("Failed to verify password")
}
