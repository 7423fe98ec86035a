//! Unit tests for the authentication flows

use std::sync::Arc;

use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{InMemoryTokenRepository, InMemoryUserRepository, UserRepository};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::session::{LogoutScope, SessionRotationService};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::verification::{InMemoryCodeStore, VerificationGate};

use super::mocks::MockMailService;

type TestAuthService =
    AuthService<InMemoryUserRepository, InMemoryTokenRepository, InMemoryCodeStore, MockMailService>;

struct Fixture {
    users: Arc<InMemoryUserRepository>,
    mail: Arc<MockMailService>,
    service: TestAuthService,
}

fn fixture_with_mail(mail: MockMailService) -> Fixture {
    let users = Arc::new(InMemoryUserRepository::new());
    let tokens = Arc::new(TokenService::new(
        Arc::new(InMemoryTokenRepository::new()),
        TokenServiceConfig::new("auth-test-secret"),
    ));
    let sessions = Arc::new(SessionRotationService::new(tokens));
    let gate = Arc::new(VerificationGate::with_default_ttl(Arc::new(InMemoryCodeStore::new())));
    let mail = Arc::new(mail);
    let config = AuthServiceConfig {
        bcrypt_cost: 4,
        ..AuthServiceConfig::default()
    };

    Fixture {
        users: users.clone(),
        mail: mail.clone(),
        service: AuthService::new(users, sessions, gate, mail, config),
    }
}

fn fixture() -> Fixture {
    fixture_with_mail(MockMailService::new())
}

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "correct horse battery";

fn auth_error(result: Result<impl Sized, DomainError>) -> Option<AuthError> {
    match result {
        Err(DomainError::Auth(e)) => Some(e),
        _ => None,
    }
}

#[tokio::test]
async fn test_register_sends_code_and_stores_hash() {
    let f = fixture();

    let sent = f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    assert_eq!(sent.email, EMAIL);
    assert_eq!(sent.expires_in, 60);
    assert!(f.mail.last_code_for(EMAIL).is_some());

    let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
    assert!(!user.is_verified);
    assert_ne!(user.password_hash, PASSWORD);
    assert!(bcrypt::verify(PASSWORD, &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_register_replaces_stale_unverified_account() {
    let f = fixture();

    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let stale_code = f.mail.last_code_for(EMAIL).unwrap();
    let stale = f.users.find_by_email(EMAIL).await.unwrap().unwrap();

    f.service.register(EMAIL, "Alice2", PASSWORD).await.unwrap();
    let fresh = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_ne!(stale.id, fresh.id);
    assert!(f.users.find_by_id(stale.id).await.unwrap().is_none());

    let fresh_code = f.mail.last_code_for(EMAIL).unwrap();
    if stale_code != fresh_code {
        assert!(f.service.verify(EMAIL, &stale_code).await.is_err());
    }
    assert!(f.service.verify(EMAIL, &fresh_code).await.is_ok());
}

#[tokio::test]
async fn test_register_rejects_verified_email() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let code = f.mail.last_code_for(EMAIL).unwrap();
    f.service.verify(EMAIL, &code).await.unwrap();

    let result = f.service.register(EMAIL, "Mallory", PASSWORD).await;
    assert_eq!(auth_error(result), Some(AuthError::UserAlreadyExists));
}

#[tokio::test]
async fn test_verify_issues_working_session() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let code = f.mail.last_code_for(EMAIL).unwrap();

    let pair = f.service.verify(EMAIL, &code).await.unwrap();
    let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
    assert!(user.is_verified);

    let token_service = f.service.sessions().token_service();
    assert_eq!(token_service.verify_access_token(&pair.access_token).unwrap(), user.id);

    let rotated = f.service.refresh(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    // Code is spent
    let again = f.service.verify(EMAIL, &code).await;
    assert_eq!(auth_error(again), Some(AuthError::CodeExpired));
}

#[tokio::test]
async fn test_verify_wrong_code_keeps_real_one() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let code = f.mail.last_code_for(EMAIL).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let result = f.service.verify(EMAIL, wrong).await;
    assert_eq!(auth_error(result), Some(AuthError::CodeMismatch));
    assert!(f.service.verify(EMAIL, &code).await.is_ok());
}

#[tokio::test]
async fn test_verify_unknown_user() {
    let f = fixture();
    let result = f.service.verify("ghost@example.com", "123456").await;
    assert_eq!(auth_error(result), Some(AuthError::UserNotFound));
}

#[tokio::test]
async fn test_login_flow() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();

    let unverified = f.service.login(EMAIL, PASSWORD).await;
    assert_eq!(auth_error(unverified), Some(AuthError::AccountNotVerified));

    let code = f.mail.last_code_for(EMAIL).unwrap();
    f.service.verify(EMAIL, &code).await.unwrap();

    let wrong = f.service.login(EMAIL, "not the password").await;
    assert_eq!(auth_error(wrong), Some(AuthError::InvalidCredentials));

    let unknown = f.service.login("ghost@example.com", PASSWORD).await;
    assert_eq!(auth_error(unknown), Some(AuthError::UserNotFound));

    let before = f.mail.sent_count();
    f.service.login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(f.mail.sent_count(), before + 1);

    let code = f.mail.last_code_for(EMAIL).unwrap();
    assert!(f.service.verify(EMAIL, &code).await.is_ok());
}

#[tokio::test]
async fn test_send_code_only_for_unverified() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let first = f.mail.last_code_for(EMAIL).unwrap();

    f.service.send_code(EMAIL).await.unwrap();
    let second = f.mail.last_code_for(EMAIL).unwrap();
    if first != second {
        assert!(f.service.verify(EMAIL, &first).await.is_err());
    }
    f.service.verify(EMAIL, &second).await.unwrap();

    let result = f.service.send_code(EMAIL).await;
    assert_eq!(auth_error(result), Some(AuthError::AccountAlreadyVerified));
}

#[tokio::test]
async fn test_mail_failure_is_reported() {
    let f = fixture_with_mail(MockMailService::failing());
    let result = f.service.register(EMAIL, "Alice", PASSWORD).await;
    assert_eq!(auth_error(result), Some(AuthError::MailDeliveryFailed));
}

#[tokio::test]
async fn test_logout_then_refresh_fails() {
    let f = fixture();
    f.service.register(EMAIL, "Alice", PASSWORD).await.unwrap();
    let code = f.mail.last_code_for(EMAIL).unwrap();
    let pair = f.service.verify(EMAIL, &code).await.unwrap();
    let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();

    let revoked = f
        .service
        .logout(user.id, &pair.refresh_token, LogoutScope::Family)
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    let result = f.service.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(DomainError::Token(TokenError::AuthInvalid))));
}
