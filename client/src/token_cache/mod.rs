//! Persistent client-side token storage
//!
//! - `storage` - the secure storage abstraction and its backends
//! - `cache` - the typed token pair cache on top of it

mod cache;
mod storage;

#[cfg(test)]
mod tests;

pub use cache::{ClientTokenCache, TokenPair, SESSION_ENTRY};
pub use storage::{FileSecureStorage, MemorySecureStorage, SecureStorage};
