//! bcrypt implementation of the password hashing port.

use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Lowest work factor bcrypt accepts.
pub const MIN_PASSWORD_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_PASSWORD_COST: u32 = 31;

/// Hashes passwords with bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher using `cost` rounds
    /// ([`MIN_PASSWORD_COST`]..=[`MAX_PASSWORD_COST`]).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;
        task::spawn_blocking(move || bcrypt::hash(password.as_str(), cost))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(password.as_str(), &hash))
            .await
            .map_err(|err| PasswordHashError::verify(err.to_string()))?
            .map_err(|err| PasswordHashError::verify(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(MIN_PASSWORD_COST)
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hasher().hash("secret-pass").await.expect("hash");
        assert_ne!(hashed, "secret-pass");
        assert!(hasher().verify("secret-pass", &hashed).await.expect("verify"));
        assert!(!hasher().verify("other-pass", &hashed).await.expect("verify"));
    }

    #[tokio::test]
    async fn cost_bounds_match_bcrypt() {
        let cheapest = hasher().hash("secret-pass").await.expect("hash");
        assert!(cheapest.starts_with("$2b$04$"));
        let below = BcryptPasswordHasher::new(MIN_PASSWORD_COST - 1)
            .hash("secret-pass")
            .await;
        assert!(matches!(below, Err(PasswordHashError::Hash { .. })));
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let err = hasher()
            .verify("secret-pass", "not-a-hash")
            .await
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::Verify { .. }));
    }
}
