//! Single-flight refresh token rotation
//!
//! However many requests fail with 401 at the same moment, the coordinator
//! sends one rotation to the server and hands its outcome to all of them.

mod refresh;

#[cfg(test)]
mod tests;

pub use refresh::{RefreshCoordinator, RefreshTransport};
