//! Secret hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use auto_impl::auto_impl;

use crate::AuthError;

/// One-way hashing of passwords and PINs.
///
/// Implementations must salt every digest and compare in constant time.
#[auto_impl(&, Box, Arc)]
pub trait SecretHasher: Send + Sync {
    /// Hashes `secret` into a self-describing digest string.
    fn hash(&self, secret: &str) -> Result<String, AuthError>;

    /// Returns true iff `secret` matches `digest`. A malformed digest never
    /// matches.
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Argon2id hasher producing PHC strings.
#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the library's default cost parameters.
    pub fn new() -> Self {
        Self { params: Params::default() }
    }

    /// Hasher with explicit cost parameters.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Internal(format!("hashing failed: {e}")))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        // Parameters are read from the digest itself.
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::with_cost(8, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hasher = test_hasher();
        let digest = hasher.hash("Admin123!").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("Admin123!", &digest));
        assert!(!hasher.verify("admin123!", &digest));
    }

    #[test]
    fn salts_differ() {
        let hasher = test_hasher();
        assert_ne!(hasher.hash("123456").unwrap(), hasher.hash("123456").unwrap());
    }

    #[test]
    fn malformed_digest_never_matches() {
        let hasher = test_hasher();
        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "secret"));
        assert!(!hasher.verify("secret", "$2a$10$notabcryptdigestatallxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"));
    }
}
