//! Cache module for Redis-based storage
//!
//! This module provides the Redis client with retry logic and the
//! verification code store built on it.

pub mod code_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use code_store::RedisCodeStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use dfm_shared::config::CacheConfig;
