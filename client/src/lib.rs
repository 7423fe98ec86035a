//! # DF Messenger Client
//!
//! Client-side session handling for the DF Messenger API: a persistent
//! token cache, a refresh coordinator that lets exactly one rotation run
//! at a time, and an HTTP client that replays a request once after a 401.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod session;
pub mod token_cache;

pub use api::{AuthApi, CodeSent, LogoutOutcome};
pub use config::ClientConfig;
pub use coordinator::{RefreshCoordinator, RefreshTransport};
pub use error::ClientError;
pub use http::{ApiRequest, AuthenticatedClient, HttpRefreshTransport};
pub use session::{SessionEvents, SessionStatus};
pub use token_cache::{
    ClientTokenCache, FileSecureStorage, MemorySecureStorage, SecureStorage, TokenPair,
};
