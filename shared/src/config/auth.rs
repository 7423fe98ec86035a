//! Authentication configuration: token signing and verification codes

use serde::{Deserialize, Serialize};

const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT and refresh token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for signing access tokens (HS256)
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 1209600, // 14 days
            issuer: String::from("df-messenger"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// One-time verification code settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Seconds a freshly generated code stays valid
    pub code_ttl_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 60,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Verification code configuration
    #[serde(default)]
    pub verification: VerificationConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);
        let access_token_expiry = env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry);
        let refresh_token_expiry =
            env_parse("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry);
        let code_ttl_seconds = env_parse(
            "VERIFICATION_CODE_TTL",
            VerificationConfig::default().code_ttl_seconds,
        );

        Self {
            jwt: JwtConfig {
                secret,
                access_token_expiry,
                refresh_token_expiry,
                issuer: defaults.issuer,
            },
            verification: VerificationConfig { code_ttl_seconds },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 14 * 86400);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(7);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_verification_config_default() {
        assert_eq!(VerificationConfig::default().code_ttl_seconds, 60);
    }
}
