//! Result types returned by the session rotation service

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::token::TokenPair;

/// Credentials handed out when a session family starts or advances
#[derive(Clone)]
pub struct IssuedSession {
    /// Opaque refresh secret for the next rotation
    pub refresh_token: String,
    /// Signed access token
    pub access_token: String,
    pub user_id: Uuid,
    pub family_id: Uuid,
}

/// A rotation hands back the same shape as a fresh sign-in
pub type RotatedSession = IssuedSession;

impl IssuedSession {
    /// Converts into the pair sent over the wire
    pub fn into_pair(self) -> TokenPair {
        TokenPair::new(self.access_token, self.refresh_token)
    }
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("user_id", &self.user_id)
            .field("family_id", &self.family_id)
            .finish_non_exhaustive()
    }
}

/// Which of a user's sessions a logout revokes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutScope {
    /// Only the family the presented secret belongs to
    #[default]
    Family,
    /// Every family of the user
    AllSessions,
}
