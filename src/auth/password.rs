//! Password hashing
//!
//! Argon2id, stored as a PHC string (`$argon2id$v=19$m=..,t=..,p=1$salt$hash`).
//! Verification reads the cost parameters back out of the stored string, so
//! the configured cost can change without invalidating existing accounts.

use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

/// Hashing failures. These are server faults, never the caller's.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Invalid argon2 parameters: {0}")]
    Params(argon2::Error),

    #[error("Password hashing failed: {0}")]
    Hash(password_hash::Error),
}

/// Hashes and verifies account passwords
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    memory_kib: u32,
    iterations: u32,
}

impl PasswordHasher {
    pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;
    pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;
    pub const MIN_MEMORY_KIB: u32 = Params::MIN_M_COST;

    pub fn new(memory_kib: u32, iterations: u32) -> Self {
        Self {
            memory_kib: memory_kib.max(Self::MIN_MEMORY_KIB),
            iterations: iterations.max(1),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.memory_kib, self.iterations, 1, None)
            .map_err(PasswordError::Params)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MEMORY_KIB, Self::DEFAULT_ITERATIONS)
    }
}
