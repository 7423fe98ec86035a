//! Unit tests for the Redis code store helpers

use dfm_core::domain::entities::verification_code::CodeIdentity;
use dfm_core::services::verification::ConfirmOutcome;

use crate::cache::RedisCodeStore;

#[test]
fn test_format_code_key() {
    let identity = CodeIdentity::new("alice@example.com", "user_0123456789");
    assert_eq!(
        RedisCodeStore::format_code_key(&identity),
        "verification:code:alice@example.com:user_0123456789"
    );
}

#[test]
fn test_hash_code() {
    let hash = RedisCodeStore::hash_code("123456");
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, RedisCodeStore::hash_code("123456"));
    assert_ne!(hash, RedisCodeStore::hash_code("654321"));
    assert!(!hash.contains("123456"));
}

#[test]
fn test_outcome_from_reply() {
    assert_eq!(RedisCodeStore::outcome_from_reply(1), ConfirmOutcome::Confirmed);
    assert_eq!(RedisCodeStore::outcome_from_reply(0), ConfirmOutcome::Mismatch);
    assert_eq!(RedisCodeStore::outcome_from_reply(-1), ConfirmOutcome::Missing);
}
