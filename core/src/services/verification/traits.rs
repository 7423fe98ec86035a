//! Traits for code storage and mail delivery integration

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::verification_code::CodeIdentity;
use crate::errors::DomainError;

/// Result of an attempt to consume a stored code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Code matched and was deleted
    Confirmed,
    /// A code is stored but differs; it stays in place
    Mismatch,
    /// Nothing stored, or the stored code expired
    Missing,
}

impl ConfirmOutcome {
    pub fn is_confirmed(self) -> bool {
        self == ConfirmOutcome::Confirmed
    }
}

/// Trait for verification code storage
///
/// Both mutating operations must be atomic in the backing store.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `code` for `identity`, overwriting any previous code and its TTL
    async fn replace(
        &self,
        identity: &CodeIdentity,
        code: &str,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Delete the stored code if and only if it equals `code`
    async fn take_if_matches(
        &self,
        identity: &CodeIdentity,
        code: &str,
    ) -> Result<ConfirmOutcome, DomainError>;

    /// Delete any stored code; returns whether one existed
    async fn invalidate(&self, identity: &CodeIdentity) -> Result<bool, DomainError>;
}

/// Trait for outbound mail delivery
#[async_trait]
pub trait MailService: Send + Sync {
    /// Send a verification code; returns a delivery id
    async fn send_verification_code(
        &self,
        email: &str,
        subject: &str,
        code: &str,
    ) -> Result<String, String>;
}
