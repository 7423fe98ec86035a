//! User repository trait defining the interface for user data persistence.
//!
//! The session flows only need to look accounts up, create them and flip
//! the verification flag; profile management lives elsewhere.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example
/// ```no_run
/// # use dfm_core::repositories::UserRepository;
/// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
/// match repo.find_by_email("alice@example.com").await? {
///     Some(user) => println!("User found: {:?}", user.id),
///     None => println!("User not found"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Mark a user's email as verified
    ///
    /// # Returns
    /// * `Ok(true)` - The flag changed
    /// * `Ok(false)` - Unknown user or already verified
    async fn mark_verified(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Delete a user
    ///
    /// # Returns
    /// * `Ok(true)` - User was deleted
    /// * `Ok(false)` - User not found
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}
