//! Password hashing - Argon2id PHC strings

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::domain::result::{Error, Result};
use crate::domain::Argon2Params;

/// Hashes and verifies user passwords
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(params: &Argon2Params) -> Result<Self> {
        let params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(params.output_len as usize),
        )
        .map_err(|e| Error::Hashing(format!("invalid argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string
    ///
    /// The parameters embedded in the stored hash are used, so hashes made
    /// under older settings keep verifying.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| Error::Hashing(format!("unreadable stored hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&Argon2Params {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_len: 32,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("123", &hash).unwrap());
        assert!(!hasher.verify("incorrect_123", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = hasher();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(hasher().verify("x", "not-a-hash"), Err(Error::Hashing(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Argon2Params {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
            output_len: 32,
        };
        assert!(PasswordHasher::new(&params).is_err());
    }
}
