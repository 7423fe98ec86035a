//! Verification gate implementation

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::verification_code::{
    generate_code, is_well_formed, CodeIdentity, DEFAULT_CODE_TTL_SECONDS,
};
use crate::errors::DomainResult;

use super::traits::{CodeStore, ConfirmOutcome};

/// Issues and checks single-use verification codes
pub struct VerificationGate<S: CodeStore> {
    store: Arc<S>,
    default_ttl: Duration,
}

impl<S: CodeStore> VerificationGate<S> {
    /// Create a gate whose codes live for `ttl_seconds` unless overridden
    pub fn new(store: Arc<S>, ttl_seconds: u64) -> Self {
        Self {
            store,
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Create a gate with the default 60 second lifetime
    pub fn with_default_ttl(store: Arc<S>) -> Self {
        Self::new(store, DEFAULT_CODE_TTL_SECONDS)
    }

    pub fn default_ttl_seconds(&self) -> u64 {
        self.default_ttl.as_secs()
    }

    /// Generate a fresh code for `identity`, replacing any earlier one
    pub async fn generate(&self, identity: &CodeIdentity) -> DomainResult<String> {
        self.store_new_code(identity, self.default_ttl).await
    }

    /// Like `generate` with an explicit lifetime
    pub async fn generate_with_ttl(
        &self,
        identity: &CodeIdentity,
        ttl_seconds: u64,
    ) -> DomainResult<String> {
        self.store_new_code(identity, Duration::from_secs(ttl_seconds))
            .await
    }

    /// Consume the stored code if `code` matches it
    ///
    /// A mismatch leaves the stored code usable.
    pub async fn confirm(&self, identity: &CodeIdentity, code: &str) -> DomainResult<bool> {
        Ok(self.check(identity, code).await?.is_confirmed())
    }

    /// Same as `confirm` but reports why a code was refused
    pub async fn check(
        &self,
        identity: &CodeIdentity,
        code: &str,
    ) -> DomainResult<ConfirmOutcome> {
        let outcome = if is_well_formed(code) {
            self.store.take_if_matches(identity, code).await?
        } else {
            ConfirmOutcome::Mismatch
        };

        let email = identity.masked_email();
        match outcome {
            ConfirmOutcome::Confirmed => {
                tracing::info!(email = %email, event = "code_confirmed", "Verification code confirmed")
            }
            ConfirmOutcome::Mismatch => {
                tracing::warn!(email = %email, event = "code_mismatch", "Verification code mismatch")
            }
            ConfirmOutcome::Missing => {
                tracing::info!(email = %email, event = "code_missing", "No live verification code")
            }
        }

        Ok(outcome)
    }

    /// Drop any stored code for `identity`
    pub async fn invalidate(&self, identity: &CodeIdentity) -> DomainResult<bool> {
        self.store.invalidate(identity).await
    }

    async fn store_new_code(
        &self,
        identity: &CodeIdentity,
        ttl: Duration,
    ) -> DomainResult<String> {
        let code = generate_code();
        self.store.replace(identity, &code, ttl).await?;

        tracing::info!(
            email = %identity.masked_email(),
            ttl_seconds = ttl.as_secs(),
            event = "code_generated",
            "Verification code generated"
        );

        Ok(code)
    }
}
