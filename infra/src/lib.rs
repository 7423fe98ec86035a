//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for DF Messenger,
//! following Clean Architecture principles. It provides concrete
//! implementations of the storage and delivery traits defined in `dfm_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL repositories using SQLx, with the refresh token
//!   compare-and-set done as a conditional `UPDATE`
//! - **Cache**: Redis client and the verification code store
//! - **Mail**: Mail delivery collaborators
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use dfm_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and code store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Mail module - verification code delivery
pub mod mail;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Internal {
            message: error.to_string(),
        }
    }
}
