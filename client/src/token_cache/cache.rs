//! Typed cache of the current token pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::ClientError;

use super::storage::SecureStorage;

/// Secure storage entry holding the JSON-encoded [`TokenPair`]
pub const SESSION_ENTRY: &str = "dfm.session";

/// Access and refresh token as returned by the server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The client's view of its current session tokens
#[derive(Clone)]
pub struct ClientTokenCache {
    storage: Arc<dyn SecureStorage>,
}

impl ClientTokenCache {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// Current pair; `None` when absent or unreadable
    ///
    /// Read and decode failures are logged and reported as absence, which
    /// sends the user back to sign-in instead of surfacing storage errors.
    pub async fn get(&self) -> Option<TokenPair> {
        let raw = match self.storage.read(SESSION_ENTRY).await {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to read cached session");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(pair) => Some(pair),
            Err(error) => {
                tracing::warn!(error = %error, "Cached session is corrupted");
                None
            }
        }
    }

    /// Persist a pair, replacing any previous one
    pub async fn set(&self, pair: &TokenPair) -> Result<(), ClientError> {
        let raw = serde_json::to_string(pair)
            .map_err(|e| ClientError::Storage(format!("failed to encode session: {}", e)))?;
        self.storage.write(SESSION_ENTRY, &raw).await
    }

    /// Remove the cached pair
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.storage.delete(SESSION_ENTRY).await
    }
}
