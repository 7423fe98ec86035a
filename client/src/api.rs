//! Authentication calls and session bootstrap

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::error::ClientError;
use crate::http::{build_http_client, read_json, ApiRequest, AuthenticatedClient, HttpRefreshTransport};
use crate::session::{SessionEvents, SessionStatus};
use crate::token_cache::{ClientTokenCache, SecureStorage, TokenPair};

/// Server answer to register, login and sendCode
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSent {
    pub message: String,
    /// Seconds the mailed code stays valid
    pub expires_in: u64,
}

/// Server answer to logout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOutcome {
    pub success: bool,
    pub revoked_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    email: &'a str,
    nick_name: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutBody<'a> {
    old_refresh_token: &'a str,
    all_sessions: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyAnswer {
    access_token: String,
    refresh_token: String,
}

/// Entry point of the client: sign-in flows, sign-out and the
/// authenticated client for everything else
pub struct AuthApi {
    http: reqwest::Client,
    config: ClientConfig,
    cache: ClientTokenCache,
    session: SessionEvents,
    client: AuthenticatedClient,
}

impl AuthApi {
    /// Wire the cache, coordinator and HTTP clients over `storage`
    pub fn new(config: ClientConfig, storage: Arc<dyn SecureStorage>) -> Result<Self, ClientError> {
        let http = build_http_client(&config)?;
        let cache = ClientTokenCache::new(storage);
        let session = SessionEvents::default();

        let transport = Arc::new(HttpRefreshTransport::new(http.clone(), config.clone()));
        let coordinator = RefreshCoordinator::new(cache.clone(), transport, session.clone());
        let client = AuthenticatedClient::new(http.clone(), config.clone(), cache.clone(), coordinator);

        Ok(Self {
            http,
            config,
            cache,
            session,
            client,
        })
    }

    /// Client for calls that need a signed-in user
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Session status changes, for routing between sign-in and the app
    pub fn session_status(&self) -> watch::Receiver<SessionStatus> {
        self.session.subscribe()
    }

    /// Decide the start-up screen from the cached session
    ///
    /// Only checks that a pair is cached; an expired pair is discovered on
    /// the first request and refreshed or signed out from there.
    pub async fn bootstrap(&self) -> SessionStatus {
        let status = match self.cache.get().await {
            Some(_) => SessionStatus::SignedIn,
            None => SessionStatus::SignedOut,
        };
        self.session.publish(status);
        status
    }

    pub async fn register(
        &self,
        email: &str,
        nick_name: &str,
        password: &str,
    ) -> Result<CodeSent, ClientError> {
        self.post_public(
            "/auth/register",
            &RegisterBody {
                email,
                nick_name,
                password,
            },
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<CodeSent, ClientError> {
        self.post_public("/auth/login", &LoginBody { email, password })
            .await
    }

    pub async fn send_code(&self, email: &str) -> Result<CodeSent, ClientError> {
        self.post_public("/auth/sendCode", &EmailBody { email }).await
    }

    /// Confirm a mailed code, persist the new session and publish `SignedIn`
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), ClientError> {
        let answer: VerifyAnswer = self
            .post_public("/auth/verify", &VerifyBody { email, code })
            .await?;

        self.cache
            .set(&TokenPair::new(answer.access_token, answer.refresh_token))
            .await?;
        self.session.publish(SessionStatus::SignedIn);
        Ok(())
    }

    /// Revoke the session on the server and forget it locally
    ///
    /// The local session is cleared and `SignedOut` published whatever the
    /// server says, so a failed call never leaves the user half signed in.
    pub async fn logout(&self, all_sessions: bool) -> Result<LogoutOutcome, ClientError> {
        let outcome = match self.cache.get().await {
            Some(pair) => {
                let request = ApiRequest::post(
                    "/user/logout",
                    &LogoutBody {
                        old_refresh_token: &pair.refresh_token,
                        all_sessions,
                    },
                );
                match request {
                    Ok(request) => self.client.execute_json(&request).await,
                    Err(error) => Err(error),
                }
            }
            None => Err(ClientError::SignedOut),
        };

        if let Err(error) = self.cache.clear().await {
            tracing::error!(error = %error, "Failed to clear cached session on logout");
        }
        self.session.publish(SessionStatus::SignedOut);

        outcome
    }

    async fn post_public<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.config.url(path))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}
