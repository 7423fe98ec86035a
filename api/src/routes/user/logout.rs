use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{LogoutRequest, LogoutResponse};
use crate::handlers::{handle_domain_error, handle_validation_error};
use crate::middleware::AuthContext;

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, LogoutScope, MailService};

use super::super::AppState;

/// Handler for POST /user/logout
///
/// Revokes the session family of the presented refresh token, or every
/// session of the caller when `allSessions` is true. Requires a Bearer
/// access token belonging to the same user as the refresh token.
///
/// Logging out twice is not an error: the second call reports
/// `success: false` with a zero count.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "revokedCount": 3
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing access token, or a refresh token that is
///   unknown or belongs to someone else
pub async fn logout<U, R, S, M>(
    state: web::Data<AppState<U, R, S, M>>,
    auth: AuthContext,
    request: web::Json<LogoutRequest>,
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

    let scope = if request.all_sessions.unwrap_or(false) {
        LogoutScope::AllSessions
    } else {
        LogoutScope::Family
    };

    match state
        .auth_service
        .logout(auth.user_id, &request.old_refresh_token, scope)
        .await
    {
        Ok(revoked) => HttpResponse::Ok().json(LogoutResponse {
            success: revoked > 0,
            revoked_count: revoked,
        }),
        Err(error) => handle_domain_error(error),
    }
}
