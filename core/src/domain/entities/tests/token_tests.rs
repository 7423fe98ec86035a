//! Unit tests for token entities

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair, REFRESH_TOKEN_EXPIRY_DAYS};

#[test]
fn test_access_token_claims() {
    let user_id = Uuid::new_v4();
    let claims = Claims::new_access_token(user_id, 900);

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.exp - claims.iat, 900);
    assert_eq!(claims.user_id().unwrap(), user_id);
}

#[test]
fn test_new_family_record() {
    let user_id = Uuid::new_v4();
    let record = RefreshToken::new_family(
        user_id,
        "hash_v1".to_string(),
        Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
    );

    assert_eq!(record.user_id, user_id);
    assert!(record.previous_token_hash.is_none());
    assert!(record.used_at.is_none());
    assert!(!record.revoked);
    assert!(record.is_consumable());
    assert_eq!(
        (record.expires_at - record.issued_at).num_days(),
        REFRESH_TOKEN_EXPIRY_DAYS
    );
}

#[test]
fn test_successor_keeps_lineage() {
    let first = RefreshToken::new_family(Uuid::new_v4(), "hash_v1".to_string(), Duration::days(14));
    let second = first.successor("hash_v2".to_string(), Duration::days(14));

    assert_eq!(second.family_id, first.family_id);
    assert_eq!(second.user_id, first.user_id);
    assert_eq!(second.previous_token_hash.as_deref(), Some("hash_v1"));
    assert_ne!(second.id, first.id);
}

#[test]
fn test_consumability() {
    let mut used = RefreshToken::new_family(Uuid::new_v4(), "a".to_string(), Duration::days(14));
    used.used_at = Some(Utc::now());
    assert!(used.is_used());
    assert!(!used.is_consumable());

    let mut revoked = RefreshToken::new_family(Uuid::new_v4(), "b".to_string(), Duration::days(14));
    revoked.revoke();
    assert!(!revoked.is_consumable());

    let expired = RefreshToken::new_family(Uuid::new_v4(), "c".to_string(), Duration::seconds(-1));
    assert!(expired.is_expired());
    assert!(!expired.is_consumable());
}

#[test]
fn test_token_pair_serializes_camel_case() {
    let pair = TokenPair::new("access".to_string(), "refresh".to_string());
    let json = serde_json::to_value(&pair).unwrap();

    assert_eq!(json["accessToken"], "access");
    assert_eq!(json["refreshToken"], "refresh");
}
