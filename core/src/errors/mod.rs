//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Whether the caller must start over with a full login
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            DomainError::Token(TokenError::AuthInvalid | TokenError::ReuseDetected)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
