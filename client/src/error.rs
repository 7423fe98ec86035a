//! Client error type

use thiserror::Error;

/// Errors surfaced to callers of the client
///
/// Cloneable so a single refresh outcome can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("No refresh token available")]
    RefreshExhausted,

    #[error("Refresh token rejected by the server")]
    RefreshRejected,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Secure storage error: {0}")]
    Storage(String),

    #[error("Session ended")]
    SignedOut,

    #[error("Server returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// Whether the user has to sign in again
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            ClientError::RefreshExhausted | ClientError::RefreshRejected | ClientError::SignedOut
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error.to_string())
    }
}
