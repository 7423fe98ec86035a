//! Bearer token authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the access token from the Authorization header,
//! verifies it through the core token issuer, and injects the caller's
//! identity into the request extensions.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::{header::AUTHORIZATION, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use dfm_core::{errors::DomainResult, repositories::TokenRepository, services::TokenService};
use dfm_shared::error_codes;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use crate::dto::{ErrorResponse, ErrorResponseExt};

/// User authentication context injected into requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID taken from the access token subject
    pub user_id: Uuid,
}

/// Object-safe view of the access token check, so the middleware does not
/// carry the repository type parameter
pub trait AccessTokenVerifier: Send + Sync {
    fn verify_access_token(&self, token: &str) -> DomainResult<Uuid>;
}

impl<R: TokenRepository> AccessTokenVerifier for TokenService<R> {
    fn verify_access_token(&self, token: &str) -> DomainResult<Uuid> {
        TokenService::<R>::verify_access_token(self, token)
    }
}

/// Access token authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl JwtAuth {
    /// Creates the middleware around a token verifier
    pub fn new(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

/// Access token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => return Err(unauthorized("Missing or invalid Authorization header")),
            };

            let user_id = match verifier.verify_access_token(&token) {
                Ok(user_id) => user_id,
                Err(error) => {
                    tracing::debug!(error = %error, path = req.path(), "Access token rejected");
                    return Err(unauthorized("Invalid or expired access token"));
                }
            };

            req.extensions_mut().insert(AuthContext { user_id });

            service.call(req).await
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|s| s.to_string())
}

fn unauthorized(message: &'static str) -> Error {
    let response = ErrorResponse::new(error_codes::UNAUTHORIZED, message)
        .to_response(StatusCode::UNAUTHORIZED);
    InternalError::from_response(message, response).into()
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| unauthorized("Authentication required"));

        ready(result)
    }
}
