//! Unit tests for the verification gate

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::verification_code::{is_well_formed, CodeIdentity};
use crate::services::verification::{ConfirmOutcome, InMemoryCodeStore, VerificationGate};

fn gate() -> (Arc<InMemoryCodeStore>, VerificationGate<InMemoryCodeStore>) {
    let store = Arc::new(InMemoryCodeStore::new());
    (store.clone(), VerificationGate::with_default_ttl(store))
}

fn alice() -> CodeIdentity {
    CodeIdentity::new("alice@example.com", "user_alice")
}

/// A well-formed code guaranteed to differ from `code`
fn other_code(code: &str) -> String {
    if code == "123456" { "654321" } else { "123456" }.to_string()
}

#[tokio::test]
async fn test_generated_code_shape() {
    let (_store, gate) = gate();
    for _ in 0..50 {
        let code = gate.generate(&alice()).await.unwrap();
        assert!(is_well_formed(&code));
        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }
}

#[tokio::test]
async fn test_code_is_single_use() {
    let (store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();

    assert!(gate.confirm(&alice(), &code).await.unwrap());
    assert!(!store.contains(&alice()).await);
    assert!(!gate.confirm(&alice(), &code).await.unwrap());
}

#[tokio::test]
async fn test_wrong_guess_keeps_real_code() {
    let (_store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();

    let outcome = gate.check(&alice(), &other_code(&code)).await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::Mismatch);
    assert!(gate.confirm(&alice(), &code).await.unwrap());
}

#[tokio::test]
async fn test_malformed_code_does_not_touch_store() {
    let (store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();

    for bad in ["", "12345", "1234567", "12a456", " 123456"] {
        assert!(!gate.confirm(&alice(), bad).await.unwrap());
    }
    assert!(store.contains(&alice()).await);
    assert!(gate.confirm(&alice(), &code).await.unwrap());
}

#[tokio::test]
async fn test_regenerate_replaces_previous_code() {
    let (_store, gate) = gate();
    let first = gate.generate(&alice()).await.unwrap();
    let mut second = gate.generate(&alice()).await.unwrap();
    while second == first {
        second = gate.generate(&alice()).await.unwrap();
    }

    assert!(!gate.confirm(&alice(), &first).await.unwrap());
    assert!(gate.confirm(&alice(), &second).await.unwrap());
}

#[tokio::test]
async fn test_codes_are_bound_to_identity() {
    let (_store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();
    let reregistered = CodeIdentity::new("alice@example.com", "user_other");

    let outcome = gate.check(&reregistered, &code).await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::Missing);
    assert!(gate.confirm(&alice(), &code).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let (_store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;

    let outcome = gate.check(&alice(), &code).await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::Missing);
}

#[tokio::test(start_paused = true)]
async fn test_resend_resets_ttl() {
    let (_store, gate) = gate();
    gate.generate_with_ttl(&alice(), 30).await.unwrap();

    tokio::time::advance(Duration::from_secs(20)).await;
    let code = gate.generate_with_ttl(&alice(), 30).await.unwrap();
    tokio::time::advance(Duration::from_secs(20)).await;

    assert!(gate.confirm(&alice(), &code).await.unwrap());
}

#[tokio::test]
async fn test_invalidate() {
    let (_store, gate) = gate();
    let code = gate.generate(&alice()).await.unwrap();

    assert!(gate.invalidate(&alice()).await.unwrap());
    assert!(!gate.invalidate(&alice()).await.unwrap());
    assert!(!gate.confirm(&alice(), &code).await.unwrap());
}
