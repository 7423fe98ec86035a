use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{VerifyRequest, VerifyResponse};
use crate::handlers::{handle_domain_error, handle_validation_error};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};

use super::super::AppState;

/// Handler for POST /auth/verify
///
/// Confirms an emailed code and starts a new session family.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ada@example.com",
///     "code": "123456"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Verification successful",
///     "accessToken": "eyJ...",
///     "refreshToken": "opaque_refresh_secret"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email or code
/// - 401 Unauthorized: Wrong, expired or already used code
pub async fn verify<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    request: web::Json<VerifyRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    S: CodeStore + 'static,
    M: MailService + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_error(errors);
    }

    match state.auth_service.verify(&request.email, &request.code).await {
        Ok(pair) => HttpResponse::Ok().json(VerifyResponse {
            message: "Verification successful".to_string(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
        Err(error) => handle_domain_error(error),
    }
}
