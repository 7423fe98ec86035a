use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::LoginRequest;
use crate::handlers::{handle_domain_error, handle_validation_error};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};

use super::super::AppState;
use super::code_sent;

/// Handler for POST /auth/login
///
/// Checks the password of a verified account and mails a sign-in code.
/// Tokens are only handed out once that code is confirmed at `/auth/verify`.
///
/// ## Errors
/// - 401 Unauthorized: Unknown email or wrong password (same body for both)
/// - 403 Forbidden: The account never confirmed its registration code
pub async fn login<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    request: web::Json<LoginRequest>,
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

    match state.auth_service.login(&request.email, &request.password).await {
        Ok(result) => code_sent(result),
        Err(error) => handle_domain_error(error),
    }
}
