//! Shared configuration and common types for DF Messenger server crates
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The error response body every endpoint returns on failure

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, ServerConfig, StorageBackend, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
