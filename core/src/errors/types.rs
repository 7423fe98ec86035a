//! Error types for authentication and token management

use thiserror::Error;

/// Authentication flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Verification code expired")]
    CodeExpired,

    #[error("Invalid verification code")]
    CodeMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Account already verified")]
    AccountAlreadyVerified,

    #[error("Account not verified")]
    AccountNotVerified,

    #[error("Failed to deliver verification code")]
    MailDeliveryFailed,
}

/// Token errors
///
/// `AuthInvalid` and `ReuseDetected` are reported identically to callers;
/// the distinction only drives server-side revocation and logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    AuthInvalid,

    #[error("Refresh token reuse detected")]
    ReuseDetected,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
