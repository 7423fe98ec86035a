//! In-memory implementation of TokenRepository
//!
//! Every mutation runs under the map's write lock, which makes `mark_used`
//! a true compare-and-set within one process. It is meant for tests and
//! single-instance development; replicas need a shared store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Process-local token repository keyed by token hash
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryTokenRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, revoked and used ones included
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether the repository holds no records
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn mark_used(
        &self,
        token_hash: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if token.used_at.is_none() => {
                token.used_at = Some(used_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_family(&self, family_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.family_id == family_id && !token.revoked {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            let in_scope = family_id.map_or(true, |family| token.family_id == family);
            if token.user_id == user_id && in_scope && !token.revoked {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn find_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut family: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect();
        family.sort_by_key(|t| t.issued_at);
        Ok(family)
    }
}
