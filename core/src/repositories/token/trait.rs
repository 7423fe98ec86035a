//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken record persistence operations
///
/// Implementations must be safe to share between several stateless server
/// replicas: `mark_used` in particular has to be a single conditional write
/// at the storage layer, never a read followed by a write in application code.
///
/// # Security Considerations
/// - Only hashes of refresh secrets are stored
/// - Records are never deleted; revocation is a flag
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved record
    /// * `Err(DomainError)` - Save failed (e.g., duplicate hash)
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token record by its hash, whatever its state
    ///
    /// # Example
    /// ```no_run
    /// # use dfm_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// match repo.find_by_hash("sha256_hash_of_secret").await? {
    ///     Some(token) if token.is_consumable() => println!("rotatable for {}", token.user_id),
    ///     Some(_) => println!("used, revoked or expired"),
    ///     None => println!("unknown secret"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Atomically set `used_at` if and only if it is still unset
    ///
    /// # Returns
    /// * `Ok(true)` - This caller consumed the record
    /// * `Ok(false)` - The record was already consumed (or does not exist)
    async fn mark_used(&self, token_hash: &str, used_at: DateTime<Utc>)
        -> Result<bool, DomainError>;

    /// Revoke every record of a session family
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records that changed from unrevoked to revoked
    async fn revoke_family(&self, family_id: Uuid) -> Result<usize, DomainError>;

    /// Revoke a user's unrevoked records, optionally limited to one family
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked by this call
    async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<usize, DomainError>;

    /// All records of a family, oldest first
    async fn find_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Check if a secret hash refers to a record that can still be exchanged
    async fn is_consumable(&self, token_hash: &str) -> Result<bool, DomainError> {
        match self.find_by_hash(token_hash).await? {
            Some(token) => Ok(token.is_consumable()),
            None => Ok(false),
        }
    }
}
