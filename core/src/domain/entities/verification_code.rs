//! Verification code primitives for email-based confirmation.

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default validity window for a freshly generated code
pub const DEFAULT_CODE_TTL_SECONDS: u64 = 60;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Identity a verification code is bound to
///
/// Keyed by email plus username so that re-registering an address under a new
/// account never matches a code issued to the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeIdentity {
    pub email: String,
    pub username: String,
}

impl CodeIdentity {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
        }
    }

    /// Storage key for this identity
    pub fn key(&self) -> String {
        format!("{}:{}", self.email, self.username)
    }

    /// Email with the local part masked, for logs
    pub fn masked_email(&self) -> String {
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first = local.chars().next().unwrap_or('*');
                format!("{}***@{}", first, domain)
            }
            _ => "***".to_string(),
        }
    }
}

/// Draws a uniform six-digit code from the OS CSPRNG
pub fn generate_code() -> String {
    OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Whether `code` has the shape of a verification code (six ASCII digits)
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
