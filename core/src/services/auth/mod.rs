//! Authentication service module
//!
//! Orchestrates the email flows that end in a session:
//! - Registration with password hashing and a verification code
//! - Password login followed by a verification code
//! - Code resend for unverified accounts
//! - Code confirmation that births a session family
//! - Refresh and logout delegated to session rotation

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
pub use types::SendCodeResult;
