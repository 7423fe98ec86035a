//! # DF Messenger Core
//!
//! Core session lifecycle logic for the DF Messenger backend.
//! This crate contains domain entities, the token issuer, the refresh token
//! rotation service, the verification code gate, repository interfaces,
//! and error types that form the foundation of the application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
