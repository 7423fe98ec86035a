//! In-memory code store for tests and single-instance development

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::entities::verification_code::CodeIdentity;
use crate::errors::DomainError;

use super::traits::{CodeStore, ConfirmOutcome};

#[derive(Debug, Clone)]
struct StoredCode {
    code: String,
    expires_at: Instant,
}

/// Code store backed by a mutex-guarded map
///
/// Expiry uses `tokio::time::Instant`, so paused test clocks apply.
#[derive(Clone, Default)]
pub struct InMemoryCodeStore {
    entries: Arc<Mutex<HashMap<String, StoredCode>>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an unexpired code is stored for `identity`
    pub async fn contains(&self, identity: &CodeIdentity) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(&identity.key())
            .map_or(false, |stored| stored.expires_at > Instant::now())
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn replace(
        &self,
        identity: &CodeIdentity,
        code: &str,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            identity.key(),
            StoredCode {
                code: code.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn take_if_matches(
        &self,
        identity: &CodeIdentity,
        code: &str,
    ) -> Result<ConfirmOutcome, DomainError> {
        let key = identity.key();
        let mut entries = self.entries.lock().await;

        let Some(stored) = entries.get(&key) else {
            return Ok(ConfirmOutcome::Missing);
        };

        if stored.expires_at <= Instant::now() {
            entries.remove(&key);
            return Ok(ConfirmOutcome::Missing);
        }

        if constant_time_eq(stored.code.as_bytes(), code.as_bytes()) {
            entries.remove(&key);
            Ok(ConfirmOutcome::Confirmed)
        } else {
            Ok(ConfirmOutcome::Mismatch)
        }
    }

    async fn invalidate(&self, identity: &CodeIdentity) -> Result<bool, DomainError> {
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(&identity.key()).is_some())
    }
}
