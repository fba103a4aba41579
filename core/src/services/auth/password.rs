//! Delegated password hashing and verification primitive.

use tracing::warn;

use crate::errors::{DomainError, DomainResult};

/// Password hashing primitive, kept behind a trait so tests can swap in a
/// cheap implementation
pub trait PasswordVerifier: Send + Sync {
    /// Hash a plaintext password for storage
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// Check a plaintext password against a stored hash
    fn matches(&self, plaintext: &str, password_hash: &str) -> bool;
}

/// bcrypt-backed implementation
pub struct BcryptPasswordVerifier {
    cost: u32,
}

impl BcryptPasswordVerifier {
    /// Creates a verifier with an explicit cost factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordVerifier {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordVerifier for BcryptPasswordVerifier {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| DomainError::Internal {
            message: format!("password hashing failed: {}", e),
        })
    }

    fn matches(&self, plaintext: &str, password_hash: &str) -> bool {
        match bcrypt::verify(plaintext, password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                // An unparsable stored hash counts as a mismatch
                warn!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        // Minimum cost keeps the test fast
        let verifier = BcryptPasswordVerifier::new(4);
        let hash = verifier.hash("correct horse battery staple").unwrap();

        assert!(verifier.matches("correct horse battery staple", &hash));
        assert!(!verifier.matches("wrong password", &hash));
    }

    #[test]
    fn test_garbage_hash_is_a_mismatch() {
        let verifier = BcryptPasswordVerifier::new(4);
        assert!(!verifier.matches("anything", "not-a-bcrypt-hash"));
    }
}
