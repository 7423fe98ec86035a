//! Session rotation service implementation

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;
use crate::services::token::TokenService;

use super::types::{IssuedSession, LogoutScope, RotatedSession};

/// Rotates refresh records and enforces single use
///
/// Holds no state of its own. Every decision that has to be atomic across
/// concurrent requests is delegated to the repository's `mark_used`.
pub struct SessionRotationService<R: TokenRepository> {
    tokens: Arc<TokenService<R>>,
}

impl<R: TokenRepository> SessionRotationService<R> {
    pub fn new(tokens: Arc<TokenService<R>>) -> Self {
        Self { tokens }
    }

    pub fn token_service(&self) -> &TokenService<R> {
        &self.tokens
    }

    /// Starts a new session family for a user who just proved their identity
    pub async fn start_session(&self, user_id: Uuid) -> DomainResult<IssuedSession> {
        let refresh = self.tokens.issue_refresh_record(user_id, None).await?;
        let access_token = self.tokens.issue_access_token(user_id)?;

        tracing::info!(
            user_id = %user_id,
            family_id = %refresh.record.family_id,
            event = "session_started",
            "New session family started"
        );

        Ok(IssuedSession {
            refresh_token: refresh.secret,
            access_token,
            user_id,
            family_id: refresh.record.family_id,
        })
    }

    /// Exchanges a refresh secret for its successor and a fresh access token
    ///
    /// # Returns
    ///
    /// * `Ok(RotatedSession)` - The caller won the exchange
    /// * `Err(TokenError::AuthInvalid)` - Unknown, revoked or expired secret
    /// * `Err(TokenError::ReuseDetected)` - Secret was already exchanged; the
    ///   whole family has been revoked
    pub async fn rotate(&self, old_secret: &str) -> DomainResult<RotatedSession> {
        let token_hash = TokenService::<R>::hash_secret(old_secret);
        let repository = self.tokens.repository();

        let record = match repository.find_by_hash(&token_hash).await? {
            Some(record) => record,
            None => {
                tracing::debug!(event = "refresh_rejected", reason = "unknown", "Unknown refresh secret");
                return Err(TokenError::AuthInvalid.into());
            }
        };

        if record.revoked || record.is_expired() {
            tracing::debug!(
                family_id = %record.family_id,
                revoked = record.revoked,
                event = "refresh_rejected",
                "Refresh record no longer valid"
            );
            return Err(TokenError::AuthInvalid.into());
        }

        if record.is_used() {
            return Err(self.reuse_detected(&record).await);
        }

        if !repository.mark_used(&token_hash, Utc::now()).await? {
            // Another request consumed the record between lookup and update
            return Err(self.reuse_detected(&record).await);
        }

        let successor = self.tokens.issue_successor(&record).await?;

        // A concurrent reuse may have revoked the family before the successor
        // was stored; it must not outlive that revocation.
        let revoked_meanwhile = repository
            .find_by_hash(&token_hash)
            .await?
            .map_or(true, |current| current.revoked);
        if revoked_meanwhile {
            return Err(self.reuse_detected(&record).await);
        }

        let access_token = self.tokens.issue_access_token(record.user_id)?;

        tracing::info!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            event = "refresh_rotated",
            "Refresh token rotated"
        );

        Ok(RotatedSession {
            refresh_token: successor.secret,
            access_token,
            user_id: record.user_id,
            family_id: record.family_id,
        })
    }

    /// Revokes the requester's sessions
    ///
    /// The secret may be in any state, so a repeated logout reports zero
    /// records instead of failing.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records revoked by this call
    /// * `Err(TokenError::AuthInvalid)` - Unknown secret, or one that belongs
    ///   to another user
    pub async fn logout(
        &self,
        requester: Uuid,
        secret: &str,
        scope: LogoutScope,
    ) -> DomainResult<usize> {
        let token_hash = TokenService::<R>::hash_secret(secret);
        let repository = self.tokens.repository();

        let record = repository
            .find_by_hash(&token_hash)
            .await?
            .ok_or(DomainError::Token(TokenError::AuthInvalid))?;

        if record.user_id != requester {
            tracing::warn!(
                requester = %requester,
                event = "logout_owner_mismatch",
                "Logout attempted with another user's refresh token"
            );
            return Err(TokenError::AuthInvalid.into());
        }

        let family = match scope {
            LogoutScope::Family => Some(record.family_id),
            LogoutScope::AllSessions => None,
        };
        let revoked = repository.revoke_user_tokens(requester, family).await?;

        tracing::info!(
            user_id = %requester,
            scope = ?scope,
            revoked_count = revoked,
            event = "session_logged_out",
            "Sessions revoked on logout"
        );

        Ok(revoked)
    }

    async fn reuse_detected(&self, record: &RefreshToken) -> DomainError {
        tracing::warn!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            event = "refresh_reuse_detected",
            "Consumed refresh token presented again"
        );

        match self.tokens.repository().revoke_family(record.family_id).await {
            Ok(count) => {
                tracing::warn!(
                    family_id = %record.family_id,
                    revoked_count = count,
                    event = "family_revoked",
                    "Session family revoked"
                );
                TokenError::ReuseDetected.into()
            }
            Err(e) => e,
        }
    }
}
