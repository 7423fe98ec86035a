//! Configuration module with business-specific sub-modules
//!
//! - `auth` - access/refresh token lifetimes and verification code TTL
//! - `cache` - Redis configuration for the verification code store
//! - `database` - MySQL pool configuration for refresh token records
//! - `environment` - environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig, VerificationConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Which storage adapters the server wires up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local stores; state is lost on restart and not shared between replicas
    #[default]
    Memory,
    /// MySQL for users and refresh tokens, Redis for verification codes
    External,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "external" | "mysql" => Ok(StorageBackend::External),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageBackend,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageBackend::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        let storage = std::env::var("STORAGE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            cache: CacheConfig::from_env(),
            storage,
            logging,
        }
    }

    /// Check the configuration for settings that must not reach production
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err("JWT_SECRET must be set in production".to_string());
        }
        if self.environment.is_production() && self.storage == StorageBackend::Memory {
            return Err("in-memory storage cannot be used in production".to_string());
        }
        if self.auth.jwt.access_token_expiry <= 0 || self.auth.jwt.refresh_token_expiry <= 0 {
            return Err("token expiry values must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = AppConfig {
            environment: Environment::Production,
            storage: StorageBackend::External,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            environment: Environment::Production,
            storage: StorageBackend::External,
            auth: AuthConfig {
                jwt: JwtConfig::new("a-real-secret"),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("mysql".parse::<StorageBackend>(), Ok(StorageBackend::External));
        assert_eq!("MEMORY".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
    }
}
