//! Application factory
//!
//! Builds the Actix-web application around an [`AppState`]. The server
//! binary and the integration tests share this factory.

use actix_web::{middleware::Logger, web, App, HttpResponse};

use crate::handlers::json_error_handler;
use crate::middleware::JwtAuth;
use crate::routes::{auth, user, AppState};

use dfm_core::repositories::{TokenRepository, UserRepository};
use dfm_core::services::{CodeStore, MailService};
use dfm_shared::error_codes;

use crate::dto::ErrorResponse;

/// Create and configure the application with all dependencies
pub fn create_app<U, R, S, M>(
    app_state: web::Data<AppState<U, R, S, M>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    S: CodeStore + 'static,
    M: MailService + 'static,
{
    let bearer_auth = JwtAuth::new(app_state.access_tokens.clone());

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Logger::new("%a \"%r\" %s %b %Dms"))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register::<U, R, S, M>))
                .route("/login", web::post().to(auth::login::<U, R, S, M>))
                .route("/sendCode", web::post().to(auth::send_code::<U, R, S, M>))
                .route("/verify", web::post().to(auth::verify::<U, R, S, M>)),
        )
        .service(
            web::scope("/user")
                .route("/refresh", web::post().to(user::refresh::<U, R, S, M>))
                .route(
                    "/logout",
                    web::post()
                        .to(user::logout::<U, R, S, M>)
                        .wrap(bearer_auth),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "df-messenger-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
