//! HTTP plumbing: the refresh transport and the authenticated client

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::coordinator::{RefreshCoordinator, RefreshTransport};
use crate::error::ClientError;
use crate::token_cache::{ClientTokenCache, TokenPair};

/// A request that can be sent more than once
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    /// POST with a JSON body
    pub fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Transport(format!("failed to encode request: {}", e)))?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
    message: String,
}

/// Turn a non-success response into [`ClientError::Api`]
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    match response.json::<ServerError>().await {
        Ok(body) => ClientError::Api {
            status,
            code: body.error,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status,
            code: "unknown".to_string(),
            message: format!("unexpected response with status {}", status),
        },
    }
}

/// Decode a successful JSON response, or the server's error body
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response.json::<T>().await?)
}

pub(crate) fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {}", e)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    old_refresh_token: &'a str,
}

/// [`RefreshTransport`] over `POST /user/refresh`
///
/// Uses its own HTTP client, never the authenticated one, so a rejected
/// refresh cannot trigger another refresh.
#[derive(Debug, Clone)]
pub struct HttpRefreshTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpRefreshTransport {
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let response = self
            .http
            .post(self.config.url("/user/refresh"))
            .json(&RefreshBody {
                old_refresh_token: refresh_token,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<TokenPair>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::RefreshRejected),
            _ => Err(error_from_response(response).await),
        }
    }
}

/// HTTP client that attaches the cached access token and recovers from 401
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: ClientTokenCache,
    coordinator: RefreshCoordinator,
}

impl AuthenticatedClient {
    pub fn new(
        http: reqwest::Client,
        config: ClientConfig,
        cache: ClientTokenCache,
        coordinator: RefreshCoordinator,
    ) -> Self {
        Self {
            http,
            config,
            cache,
            coordinator,
        }
    }

    /// Send a request with the current access token
    ///
    /// A 401 answer triggers one refresh through the coordinator and one
    /// replay with the new token. The replay's response is returned as is,
    /// even when it is another 401.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let access_token = self.cache.get().await.map(|pair| pair.access_token);
        let response = self.send(request, access_token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "Access token rejected, refreshing");
        let fresh = self
            .coordinator
            .refresh(access_token.as_deref().unwrap_or_default())
            .await?;

        self.send(request, Some(&fresh)).await
    }

    /// [`execute`](Self::execute) and decode the JSON answer
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        read_json(self.execute(request).await?).await
    }

    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.config.url(&request.path));

        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}
