//! Salted password credentials
//!
//! Stored credentials have the form `<salt>.<hash>`: a random hex salt and the
//! hex Argon2 digest of the password under that salt.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Random salt size in bytes (hex-encoded to twice as many characters)
pub const SALT_BYTES: usize = 16;

/// Digest size in bytes
pub const DIGEST_BYTES: usize = 32;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password into a `salt.hash` credential
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a stored `salt.hash` credential
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Split a stored credential into its salt and hash parts on the first `.`
///
/// Returns `None` unless both parts are non-empty.
pub fn split_credential(stored: &str) -> Option<(&str, &str)> {
    let (salt, hash) = stored.split_once('.')?;

    if salt.is_empty() || hash.is_empty() {
        return None;
    }

    Some((salt, hash))
}

/// Argon2-based salted password hasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the default Argon2id cost parameters
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with explicit memory (KiB) and iteration costs
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, Some(DIGEST_BYTES))
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn digest(&self, password: &str, salt: &str) -> Result<[u8; DIGEST_BYTES], DomainError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut output = [0u8; DIGEST_BYTES];

        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(output)
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);

        let digest = self.digest(password, &salt)?;

        Ok(format!("{}.{}", salt, hex::encode(digest)))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt, hash)) = split_credential(stored) else {
            return false;
        };

        let expected = match hex::decode(hash) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        match self.digest(password, salt) {
            Ok(actual) => constant_time_compare(&actual, &expected),
            Err(_) => false,
        }
    }
}

/// Compare two byte slices without short-circuiting on the first mismatch
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::with_cost(64, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher();
        let password = "johnhasaverylongpassword";

        let stored = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &stored));
        assert!(!hasher.verify("wrong_password", &stored));
    }

    #[test]
    fn test_hash_format() {
        let hasher = test_hasher();

        let stored = hasher.hash("mypassword").unwrap();
        let (salt, hash) = split_credential(&stored).unwrap();

        assert_ne!(stored, "mypassword");
        assert_eq!(salt.len(), SALT_BYTES * 2);
        assert_eq!(hash.len(), DIGEST_BYTES * 2);
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = test_hasher();
        let password = "sharingan123";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Different salts give different credentials
        assert_ne!(hash1, hash2);

        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_verify_malformed_credential() {
        let hasher = test_hasher();

        assert!(!hasher.verify("password", "no-separator"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", ".onlyhash"));
        assert!(!hasher.verify("password", "onlysalt."));
        assert!(!hasher.verify("password", "0011223344556677.not-hex"));
        // Salt shorter than Argon2's minimum
        assert!(!hasher.verify("password", "ab.00ff"));
    }

    #[test]
    fn test_default_cost_round_trip() {
        let hasher = Argon2Hasher::new();

        let stored = hasher.hash("n15rr35").unwrap();
        assert!(hasher.verify("n15rr35", &stored));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(Argon2Hasher::with_cost(0, 0).is_err());
    }

    #[test]
    fn test_split_credential() {
        assert_eq!(split_credential("salt.hash"), Some(("salt", "hash")));
        assert_eq!(split_credential("salt.hash.extra"), Some(("salt", "hash.extra")));
        assert_eq!(split_credential("salt"), None);
        assert_eq!(split_credential("."), None);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"ab"));
    }
}
