use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::SendCodeRequest;
use crate::handlers::{handle_domain_error, handle_validation_error};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};

use super::super::AppState;
use super::code_sent;

/// Handler for POST /auth/sendCode
///
/// Mails a fresh code to an account that has not confirmed its
/// registration yet. The previous code stops working.
pub async fn send_code<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    request: web::Json<SendCodeRequest>,
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

    match state.auth_service.send_code(&request.email).await {
        Ok(result) => code_sent(result),
        Err(error) => handle_domain_error(error),
    }
}
