//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - JWT access token generation and verification
//! - Opaque refresh secret generation and hashing
//! - Refresh record issuance, for new families and for rotations

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::{IssuedRefreshToken, TokenService};
