//! Password hashing.
//!
//! Hashing is deliberately slow; callers run it on a blocking thread.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    ///
    /// # Errors
    /// Returns [`Error::Hash`] if hashing fails.
    fn hash(&self, password: &str) -> Result<String, Error>;

    /// Compare a plaintext password with a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    /// Returns [`Error::MalformedHash`] if the stored hash cannot be parsed.
    fn compare(&self, password: &str, hash: &str) -> Result<bool, Error>;
}

/// Argon2id with the crate's default parameters.
#[derive(Clone, Debug, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::Hash(err.to_string()))
    }

    fn compare(&self, password: &str, hash: &str) -> Result<bool, Error> {
        let parsed = PasswordHash::new(hash).map_err(|err| Error::MalformedHash(err.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(Error::MalformedHash(err.to_string())),
        }
    }
}
