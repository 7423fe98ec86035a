//! User entity as seen by the authentication flows.
//!
//! Profile data lives with the user storage collaborator; only the fields the
//! login and verification flows need are modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email
    pub email: String,

    /// Unique handle, generated at registration
    pub username: String,

    /// Display name chosen at registration
    pub nick_name: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the email has been confirmed with a verification code
    pub is_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified user
    pub fn new(email: String, nick_name: String, password_hash: String) -> Self {
        let id = Uuid::new_v4();
        let username = format!("user_{}", &id.simple().to_string()[..10]);

        Self {
            id,
            email,
            username,
            nick_name,
            password_hash,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    /// Marks the user's email as verified
    pub fn verify(&mut self) {
        self.is_verified = true;
    }
}
