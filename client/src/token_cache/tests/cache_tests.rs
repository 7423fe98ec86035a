use std::sync::Arc;

use crate::token_cache::{ClientTokenCache, MemorySecureStorage, SecureStorage, TokenPair, SESSION_ENTRY};

fn cache() -> (ClientTokenCache, MemorySecureStorage) {
    let storage = MemorySecureStorage::new();
    (ClientTokenCache::new(Arc::new(storage.clone())), storage)
}

#[tokio::test]
async fn test_empty_cache_returns_none() {
    let (cache, _) = cache();
    assert_eq!(cache.get().await, None);
}

#[tokio::test]
async fn test_set_get_clear() {
    let (cache, _) = cache();
    let pair = TokenPair::new("access", "refresh");

    cache.set(&pair).await.unwrap();
    assert_eq!(cache.get().await, Some(pair));

    cache.clear().await.unwrap();
    assert_eq!(cache.get().await, None);

    // Clearing twice is fine
    cache.clear().await.unwrap();
}

#[tokio::test]
async fn test_corrupted_entry_reads_as_none() {
    let (cache, storage) = cache();
    storage.write(SESSION_ENTRY, "{not json").await.unwrap();

    assert_eq!(cache.get().await, None);
}

#[tokio::test]
async fn test_stored_as_camel_case_json() {
    let (cache, storage) = cache();
    cache.set(&TokenPair::new("a", "r")).await.unwrap();

    let raw = storage.read(SESSION_ENTRY).await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["accessToken"], "a");
    assert_eq!(json["refreshToken"], "r");
}

#[test]
fn test_debug_redacts_tokens() {
    let debug = format!("{:?}", TokenPair::new("secret-access", "secret-refresh"));
    assert!(!debug.contains("secret"));
}
