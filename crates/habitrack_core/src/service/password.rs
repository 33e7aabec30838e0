//! One-way password hashing with argon2id.
//!
//! # Invariants
//! - Only PHC-format hashes are stored; cleartext never leaves this module
//!   or the validation structs.
//! - Verification of a missing user performs exactly one verification
//!   against a hash made at construction, so both login failure paths cost
//!   the same from the first request on.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DUMMY_PASSWORD: &str = "habitrack-missing-user";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    InvalidCost(String),
    Hash(String),
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCost(message) => write!(f, "invalid password hashing cost: {message}"),
            Self::Hash(message) => write!(f, "password hashing failed: {message}"),
        }
    }
}

impl Error for PasswordError {}

/// Salted argon2id hasher shared by registration and login.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl CredentialHasher {
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(
            cost.memory_kib,
            cost.iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|err| PasswordError::InvalidCost(err.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, password)
    }

    /// Checks `password` against a stored PHC hash. Malformed hashes never
    /// verify.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burns one verification against a throwaway hash. Always false.
    pub fn verify_missing_user(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{CredentialHasher, HashingCost};

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingCost {
            memory_kib: 256,
            iterations: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let hasher = fast_hasher();
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();
        assert_ne!(first, "correct horse");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &first));
        assert!(!hasher.verify("battery staple", &first));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!fast_hasher().verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn missing_user_verification_is_always_false() {
        let hasher = fast_hasher();
        assert!(!hasher.verify_missing_user("whatever"));
        assert!(!hasher.verify_missing_user(super::DUMMY_PASSWORD));
    }

    #[test]
    fn dummy_hash_is_ready_before_the_first_login() {
        let hasher = fast_hasher();
        assert!(hasher.dummy_hash.starts_with("$argon2id$"));
        assert!(hasher.verify(super::DUMMY_PASSWORD, &hasher.dummy_hash));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        assert!(CredentialHasher::new(HashingCost {
            memory_kib: 256,
            iterations: 0,
        })
        .is_err());
    }
}
