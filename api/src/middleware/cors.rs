//! CORS middleware configuration for cross-origin requests.
//!
//! Native mobile clients send no `Origin` header and are unaffected; the
//! policy matters for browser-based clients only.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use dfm_shared::{Environment, ServerConfig};

const PREFLIGHT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance configured for the current environment.
///
/// Development with no configured origins allows any origin. Otherwise only
/// the origins listed in `CORS_ALLOWED_ORIGINS` are accepted.
pub fn create_cors(environment: Environment, server: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    if server.allowed_origins.is_empty() && !environment.is_production() {
        tracing::info!(environment = %environment, "CORS allows any origin");
        return cors.allow_any_origin();
    }

    server
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| {
            tracing::info!(origin = %origin, "Adding allowed origin");
            cors.allowed_origin(origin)
        })
}
