//! Token entities for access tokens and rotating refresh tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (14 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 14;

/// Claims structure for the access token payload
///
/// The payload only identifies the subject; everything else is timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an access token valid for `ttl_seconds`
    pub fn new_access_token(user_id: Uuid, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        }
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Refresh token record stored server-side
///
/// Only the hash of the opaque secret is kept. Records are never deleted;
/// they are consumed once (`used_at`) or revoked, which keeps the lineage
/// of a session family available for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the record
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// SHA-256 hex digest of the opaque secret
    pub token_hash: String,

    /// Hash of the record this one replaced, `None` for the first of a family
    pub previous_token_hash: Option<String>,

    /// Session family shared by every rotation descending from one login
    pub family_id: Uuid,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Set exactly once, when the token is exchanged for its successor
    pub used_at: Option<DateTime<Utc>>,

    /// Whether the token has been revoked
    pub revoked: bool,
}

impl RefreshToken {
    /// Creates the first record of a new session family
    pub fn new_family(user_id: Uuid, token_hash: String, ttl: Duration) -> Self {
        Self::new(user_id, token_hash, Uuid::new_v4(), None, ttl)
    }

    /// Creates a record in an existing family
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        family_id: Uuid,
        previous_token_hash: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            previous_token_hash,
            family_id,
            issued_at: now,
            expires_at: now + ttl,
            used_at: None,
            revoked: false,
        }
    }

    /// Creates the record that replaces `self` after a rotation
    pub fn successor(&self, token_hash: String, ttl: Duration) -> Self {
        Self::new(
            self.user_id,
            token_hash,
            self.family_id,
            Some(self.token_hash.clone()),
            ttl,
        )
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Checks if the token was already exchanged
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// A record can be exchanged iff it is not revoked, not expired and not yet used
    pub fn is_consumable(&self) -> bool {
        !self.revoked && !self.is_expired() && !self.is_used()
    }

    /// Revokes the refresh token
    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}

/// Token pair handed to a client after login or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh secret
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}
