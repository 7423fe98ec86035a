//! Verification module for email-based confirmation codes
//!
//! This module provides the verification code workflow:
//! - Code generation with atomic replacement of any earlier code
//! - Single-use confirmation through an atomic compare-and-delete
//! - Storage and mail delivery behind traits

mod memory_store;
mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use memory_store::InMemoryCodeStore;
pub use service::VerificationGate;
pub use traits::{CodeStore, ConfirmOutcome, MailService};
