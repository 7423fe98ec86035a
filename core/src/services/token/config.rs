//! Configuration for the token service

use dfm_shared::config::JwtConfig;
use jsonwebtoken::Algorithm;

use crate::domain::entities::token::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh record lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
}

impl TokenServiceConfig {
    /// Create a configuration with default lifetimes
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }

    /// Override both lifetimes, in seconds
    pub fn with_expiry(mut self, access_seconds: i64, refresh_seconds: i64) -> Self {
        self.access_token_expiry_seconds = access_seconds;
        self.refresh_token_expiry_seconds = refresh_seconds;
        self
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_expiry_seconds: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
            refresh_token_expiry_seconds: REFRESH_TOKEN_EXPIRY_DAYS * 24 * 60 * 60,
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self::new(jwt.secret.clone())
            .with_expiry(jwt.access_token_expiry, jwt.refresh_token_expiry)
    }
}
