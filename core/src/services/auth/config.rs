//! Configuration for the authentication service

use dfm_shared::config::VerificationConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
    /// Lifetime of verification codes in seconds
    pub code_ttl_seconds: u64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 10,
            code_ttl_seconds: 60,
        }
    }
}

impl From<&VerificationConfig> for AuthServiceConfig {
    fn from(verification: &VerificationConfig) -> Self {
        Self {
            code_ttl_seconds: verification.code_ttl_seconds,
            ..Self::default()
        }
    }
}
