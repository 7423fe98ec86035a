use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::RegisterRequest;
use crate::handlers::{handle_domain_error, handle_validation_error};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};

use super::super::AppState;
use super::code_sent;

/// Handler for POST /auth/register
///
/// Creates an unverified account and mails its first verification code.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ada@example.com",
///     "nickName": "Ada",
///     "password": "at least eight characters"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Verification code sent to ada@example.com",
///     "expiresIn": 60
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Invalid email, nickname or password length
/// - 409 Conflict: A verified account already uses the email
/// - 503 Service Unavailable: The verification email could not be sent
pub async fn register<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    request: web::Json<RegisterRequest>,
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

    match state
        .auth_service
        .register(&request.email, &request.nick_name, &request.password)
        .await
    {
        Ok(result) => code_sent(result),
        Err(error) => handle_domain_error(error),
    }
}
