//! Main authentication service implementation

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_code::CodeIdentity;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::session::{LogoutScope, SessionRotationService};
use crate::services::verification::{CodeStore, ConfirmOutcome, MailService, VerificationGate};

use super::config::AuthServiceConfig;
use super::types::SendCodeResult;

const REGISTER_SUBJECT: &str = "Your DF Messenger registration code";
const LOGIN_SUBJECT: &str = "Your DF Messenger sign-in code";
const RESEND_SUBJECT: &str = "Your DF Messenger code";

/// Authentication service for managing the complete authentication flow
pub struct AuthService<U, R, S, M>
where
    U: UserRepository,
    R: TokenRepository,
    S: CodeStore,
    M: MailService,
{
    /// User repository for account lookups
    user_repository: Arc<U>,
    /// Session rotation for issuing and rotating refresh tokens
    sessions: Arc<SessionRotationService<R>>,
    /// Verification gate for code handling
    verification: Arc<VerificationGate<S>>,
    /// Mail collaborator for code delivery
    mail_service: Arc<M>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, R, S, M> AuthService<U, R, S, M>
where
    U: UserRepository,
    R: TokenRepository,
    S: CodeStore,
    M: MailService,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `sessions` - Session rotation service
    /// * `verification` - Verification code gate
    /// * `mail_service` - Outbound mail collaborator
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<U>,
        sessions: Arc<SessionRotationService<R>>,
        verification: Arc<VerificationGate<S>>,
        mail_service: Arc<M>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            sessions,
            verification,
            mail_service,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionRotationService<R> {
        &self.sessions
    }

    /// Register a new account and mail its first verification code
    ///
    /// A stale unverified account holding the same email is replaced, and
    /// its pending code dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - Account created and code sent
    /// * `Err(AuthError::UserAlreadyExists)` - A verified account holds the email
    pub async fn register(
        &self,
        email: &str,
        nick_name: &str,
        password: &str,
    ) -> DomainResult<SendCodeResult> {
        if let Some(existing) = self.user_repository.find_by_email(email).await? {
            if existing.is_verified {
                return Err(AuthError::UserAlreadyExists.into());
            }

            self.user_repository.delete(existing.id).await?;
            self.verification.invalidate(&identity_of(&existing)).await?;

            tracing::info!(
                user_id = %existing.id,
                event = "stale_account_replaced",
                "Unverified account replaced by a new registration"
            );
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .user_repository
            .create(User::new(email.to_string(), nick_name.to_string(), password_hash))
            .await?;

        tracing::info!(user_id = %user.id, event = "user_registered", "User registered");

        self.dispatch_code(&user, REGISTER_SUBJECT).await
    }

    /// Check a password and mail a sign-in code
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - Credentials accepted and code sent
    /// * `Err(AuthError::UserNotFound)` - No account with this email
    /// * `Err(AuthError::InvalidCredentials)` - Wrong password
    /// * `Err(AuthError::AccountNotVerified)` - Registration was never confirmed
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<SendCodeResult> {
        let user = self.find_user(email).await?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, event = "login_failed", "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_verified {
            return Err(AuthError::AccountNotVerified.into());
        }

        self.dispatch_code(&user, LOGIN_SUBJECT).await
    }

    /// Resend a verification code to an unverified account
    pub async fn send_code(&self, email: &str) -> DomainResult<SendCodeResult> {
        let user = self.find_user(email).await?;

        if user.is_verified {
            return Err(AuthError::AccountAlreadyVerified.into());
        }

        self.dispatch_code(&user, RESEND_SUBJECT).await
    }

    /// Confirm a mailed code and start a session
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The first pair of a new session family
    /// * `Err(AuthError::CodeExpired)` - No live code for the account
    /// * `Err(AuthError::CodeMismatch)` - Wrong code; the real one stays valid
    pub async fn verify(&self, email: &str, code: &str) -> DomainResult<TokenPair> {
        let user = self.find_user(email).await?;

        match self.verification.check(&identity_of(&user), code).await? {
            ConfirmOutcome::Confirmed => {}
            ConfirmOutcome::Mismatch => return Err(AuthError::CodeMismatch.into()),
            ConfirmOutcome::Missing => return Err(AuthError::CodeExpired.into()),
        }

        if self.user_repository.mark_verified(user.id).await? {
            tracing::info!(user_id = %user.id, event = "user_verified", "Email verified");
        }

        let session = self.sessions.start_session(user.id).await?;
        Ok(session.into_pair())
    }

    /// Exchange a refresh secret for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let rotated = self.sessions.rotate(refresh_token).await?;
        Ok(rotated.into_pair())
    }

    /// Revoke the caller's sessions; returns the number of records revoked
    pub async fn logout(
        &self,
        user_id: Uuid,
        refresh_token: &str,
        scope: LogoutScope,
    ) -> DomainResult<usize> {
        self.sessions.logout(user_id, refresh_token, scope).await
    }

    async fn find_user(&self, email: &str) -> DomainResult<User> {
        self.user_repository
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))
    }

    async fn dispatch_code(&self, user: &User, subject: &str) -> DomainResult<SendCodeResult> {
        let code = self
            .verification
            .generate_with_ttl(&identity_of(user), self.config.code_ttl_seconds)
            .await?;

        let message_id = self
            .mail_service
            .send_verification_code(&user.email, subject, &code)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Verification mail failed");
                DomainError::Auth(AuthError::MailDeliveryFailed)
            })?;

        Ok(SendCodeResult {
            email: user.email.clone(),
            expires_in: self.config.code_ttl_seconds,
            message_id,
        })
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing failed: {}", e),
            })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password check task failed: {}", e),
            })?;

        // A malformed stored hash is treated as a failed check
        Ok(matches.unwrap_or(false))
    }
}

fn identity_of(user: &User) -> CodeIdentity {
    CodeIdentity::new(user.email.clone(), user.username.clone())
}
