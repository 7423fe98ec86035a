//! Domain entities representing core business objects.

pub mod token;
pub mod user;
pub mod verification_code;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use token::{
    Claims, RefreshToken, TokenPair, ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use user::User;
pub use verification_code::{CodeIdentity, CODE_LENGTH, DEFAULT_CODE_TTL_SECONDS};
