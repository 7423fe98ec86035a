//! Session rotation module
//!
//! Owns the lifecycle of a session family: birth at sign-in, one-for-one
//! rotation of refresh records, reuse detection with family-wide revocation,
//! and logout.

mod service;
mod types;


pub use service::SessionRotationService;
pub use types::{IssuedSession, LogoutScope, RotatedSession};
