//! Password hashing with bcrypt.

use anyhow::{Context, Result};
use tracing::debug;

use crate::types::PasswordHash;

/// Lowest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

/// Cost used when nothing else is configured.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// One-way password hasher.
///
/// Every call to [`hash`](Self::hash) draws a fresh salt, so hashing the same
/// password twice gives two different strings. Equality is only ever checked
/// through [`verify`](Self::verify).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash of a random password, verified against when the account does not
    /// exist so that unknown-email logins cost the same as wrong-password ones.
    decoy: PasswordHash,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self> {
        let decoy_password = uuid::Uuid::new_v4().to_string();
        let decoy = bcrypt::hash(decoy_password, cost)
            .with_context(|| format!("invalid bcrypt cost {}", cost))?;

        Ok(Self {
            cost,
            decoy: PasswordHash::new(decoy),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password for storage.
    pub fn hash(&self, password: &str) -> Result<PasswordHash> {
        let hashed = bcrypt::hash(password, self.cost).context("failed to hash password")?;
        Ok(PasswordHash::new(hashed))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed hash is treated as a mismatch.
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        match bcrypt::verify(password, hash.as_str()) {
            Ok(matches) => matches,
            Err(e) => {
                debug!("password verification rejected malformed hash: {}", e);
                false
            }
        }
    }

    /// Burn the same amount of work as a real verification, always failing.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy);
        false
    }
}
