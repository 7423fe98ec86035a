//! Shared response helpers for route handlers

pub mod error;

pub use error::{handle_domain_error, handle_validation_error, json_error_handler};
