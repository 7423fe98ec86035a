//! Authentication route handlers
//!
//! Every flow that ends with an emailed code: registration, password login
//! and resend. Confirming the code starts the session.

pub mod login;
pub mod register;
pub mod send_code;
pub mod verify;

pub use login::login;
pub use register::register;
pub use send_code::send_code;
pub use verify::verify;

use actix_web::HttpResponse;
use dfm_core::services::SendCodeResult;

use crate::dto::CodeSentResponse;

pub(crate) fn code_sent(result: SendCodeResult) -> HttpResponse {
    HttpResponse::Ok().json(CodeSentResponse {
        message: format!("Verification code sent to {}", result.email),
        expires_in: result.expires_in,
    })
}
