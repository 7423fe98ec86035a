//! Mapping of domain and request errors to HTTP responses
//!
//! Every failure leaves the API as an [`ErrorResponse`]. The two refresh
//! failures, an invalid secret and a replayed one, produce byte-identical
//! bodies so a caller cannot tell which of them happened.

use actix_web::{error::InternalError, error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use dfm_core::errors::{AuthError, DomainError, TokenError};
use dfm_shared::error_codes;
use validator::ValidationErrors;

use crate::dto::{ErrorResponse, ErrorResponseExt};

/// Status, error code and client-facing message for a domain error
pub fn classify(error: &DomainError) -> (StatusCode, &'static str, &'static str) {
    match error {
        DomainError::Token(TokenError::AuthInvalid | TokenError::ReuseDetected) => (
            StatusCode::UNAUTHORIZED,
            error_codes::INVALID_REFRESH_TOKEN,
            "Invalid or expired refresh token",
        ),
        DomainError::Token(TokenError::TokenGenerationFailed) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "Failed to issue tokens",
        ),
        DomainError::Auth(auth_error) => match auth_error {
            AuthError::CodeExpired => (
                StatusCode::UNAUTHORIZED,
                error_codes::INVALID_VERIFICATION_CODE,
                "Verification code expired, request a new one",
            ),
            AuthError::CodeMismatch => (
                StatusCode::UNAUTHORIZED,
                error_codes::INVALID_VERIFICATION_CODE,
                "Invalid verification code",
            ),
            AuthError::UserNotFound | AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                error_codes::INVALID_CREDENTIALS,
                "Invalid email or password",
            ),
            AuthError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                error_codes::CONFLICT,
                "An account with this email already exists",
            ),
            AuthError::AccountAlreadyVerified => (
                StatusCode::CONFLICT,
                error_codes::CONFLICT,
                "Account is already verified",
            ),
            AuthError::AccountNotVerified => (
                StatusCode::FORBIDDEN,
                error_codes::UNAUTHORIZED,
                "Account is not verified, confirm the code sent by email",
            ),
            AuthError::MailDeliveryFailed => (
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::SERVICE_UNAVAILABLE,
                "Could not send the verification email, try again later",
            ),
        },
        DomainError::Validation { .. } => (
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            "Invalid request data",
        ),
        DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "An internal error occurred",
        ),
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let (status, code, message) = classify(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    ErrorResponse::new(code, message).to_response(status)
}

/// 400 response listing the fields that failed validation
pub fn handle_validation_error(errors: ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field.to_string(), messages);
    }

    response.to_response(StatusCode::BAD_REQUEST)
}

/// Error handler for malformed JSON bodies, installed through `JsonConfig`
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = error.to_string();
    let response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Malformed request body")
        .add_detail("reason", &message)
        .to_response(StatusCode::BAD_REQUEST);

    InternalError::from_response(error, response).into()
}
