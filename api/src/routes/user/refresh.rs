use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{RefreshRequest, TokenPairResponse};
use crate::handlers::{handle_domain_error, handle_validation_error};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};

use super::super::AppState;

/// Handler for POST /user/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is spent;
/// presenting it a second time revokes the whole session family.
///
/// # Request Body
///
/// ```json
/// {
///     "oldRefreshToken": "opaque_refresh_secret"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "refreshToken": "new_refresh_secret"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Unknown, expired, revoked or replayed refresh token.
///   The body does not say which.
pub async fn refresh<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    request: web::Json<RefreshRequest>,
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

    match state.auth_service.refresh(&request.old_refresh_token).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
        Err(error) => handle_domain_error(error),
    }
}
