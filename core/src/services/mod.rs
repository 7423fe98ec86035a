//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, SendCodeResult};
pub use session::{IssuedSession, LogoutScope, RotatedSession, SessionRotationService};
pub use token::{IssuedRefreshToken, TokenService, TokenServiceConfig};
pub use verification::{
    CodeStore, ConfirmOutcome, InMemoryCodeStore, MailService, VerificationGate,
};
