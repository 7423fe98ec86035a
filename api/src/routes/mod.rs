//! HTTP route handlers
//!
//! - `auth` - registration, login, code resend and code confirmation
//! - `user` - refresh token rotation and logout

pub mod auth;
pub mod user;

use std::sync::Arc;

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{AuthService, CodeStore, MailService};

use crate::middleware::AccessTokenVerifier;

/// Application state that holds shared services
pub struct AppState<U, R, S, M>
where
    U: UserRepository,
    R: TokenRepository,
    S: CodeStore,
    M: MailService,
{
    pub auth_service: Arc<AuthService<U, R, S, M>>,
    /// Access token check used by the bearer middleware
    pub access_tokens: Arc<dyn AccessTokenVerifier>,
}

impl<U, R, S, M> AppState<U, R, S, M>
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    S: CodeStore + 'static,
    M: MailService + 'static,
{
    pub fn new(
        auth_service: Arc<AuthService<U, R, S, M>>,
        access_tokens: Arc<dyn AccessTokenVerifier>,
    ) -> Self {
        Self {
            auth_service,
            access_tokens,
        }
    }
}
