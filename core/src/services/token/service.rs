//! Main token service implementation

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;

/// Number of random bytes in a refresh secret (256 bits)
const REFRESH_SECRET_BYTES: usize = 32;

/// A freshly persisted refresh record together with the secret it hashes
///
/// The secret exists only here and in the response to the client.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    pub secret: String,
    pub record: RefreshToken,
}

impl fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("secret", &"<redacted>")
            .field("record", &self.record)
            .finish()
    }
}

/// Service for managing JWT access tokens and refresh records
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for persistence
    /// * `config` - Token service configuration
    pub fn new(repository: Arc<R>, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Repository the refresh records are persisted in
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Signs a short-lived access token for `user_id`
    pub fn issue_access_token(&self, user_id: Uuid) -> DomainResult<String> {
        let claims = Claims::new_access_token(user_id, self.config.access_token_expiry_seconds);
        self.encode_jwt(&claims)
    }

    /// Verifies an access token and returns the user it was issued to
    ///
    /// A bad signature, a malformed token and an expired token all fail with
    /// `TokenError::AuthInvalid`.
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Uuid> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                DomainError::Token(TokenError::AuthInvalid)
            })?;

        token_data
            .claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::AuthInvalid))
    }

    /// Generates a refresh record and stores it
    ///
    /// A new session family is started when `family_id` is `None`.
    pub async fn issue_refresh_record(
        &self,
        user_id: Uuid,
        family_id: Option<Uuid>,
    ) -> DomainResult<IssuedRefreshToken> {
        let secret = Self::generate_secret();
        let token_hash = Self::hash_secret(&secret);
        let ttl = self.refresh_ttl();

        let record = match family_id {
            Some(family_id) => RefreshToken::new(user_id, token_hash, family_id, None, ttl),
            None => RefreshToken::new_family(user_id, token_hash, ttl),
        };

        self.persist(secret, record).await
    }

    /// Generates the record that replaces `previous` in its family
    pub async fn issue_successor(
        &self,
        previous: &RefreshToken,
    ) -> DomainResult<IssuedRefreshToken> {
        let secret = Self::generate_secret();
        let record = previous.successor(Self::hash_secret(&secret), self.refresh_ttl());

        self.persist(secret, record).await
    }

    /// Hashes a refresh secret for storage and lookup (SHA-256, lowercase hex)
    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Draws a 256-bit opaque secret from the OS CSPRNG, URL-safe base64 encoded
    fn generate_secret() -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.refresh_token_expiry_seconds)
    }

    async fn persist(
        &self,
        secret: String,
        record: RefreshToken,
    ) -> DomainResult<IssuedRefreshToken> {
        let record = self
            .repository
            .save_refresh_token(record)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to persist refresh record");
                DomainError::Token(TokenError::TokenGenerationFailed)
            })?;

        Ok(IssuedRefreshToken { secret, record })
    }

    /// Encodes claims into a JWT
    fn encode_jwt(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }
}
