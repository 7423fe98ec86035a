//! Shared setup for the HTTP integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use dfm_api::routes::AppState;
use dfm_core::repositories::{InMemoryTokenRepository, InMemoryUserRepository};
use dfm_core::services::{
    AuthService, AuthServiceConfig, InMemoryCodeStore, MailService, SessionRotationService,
    TokenService, TokenServiceConfig, VerificationGate,
};

pub type TestState =
    AppState<InMemoryUserRepository, InMemoryTokenRepository, InMemoryCodeStore, CapturingMail>;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "analytical-engine";

/// Mail collaborator that keeps every delivered code
#[derive(Default)]
pub struct CapturingMail {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMail {
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailService for CapturingMail {
    async fn send_verification_code(
        &self,
        email: &str,
        _subject: &str,
        code: &str,
    ) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((email.to_string(), code.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

/// Application state over in-memory stores, plus the mailbox it delivers to
pub fn test_state() -> (web::Data<TestState>, Arc<CapturingMail>) {
    let token_service = Arc::new(TokenService::new(
        Arc::new(InMemoryTokenRepository::new()),
        TokenServiceConfig::new("integration-test-secret"),
    ));
    let sessions = Arc::new(SessionRotationService::new(token_service.clone()));
    let verification = Arc::new(VerificationGate::new(Arc::new(InMemoryCodeStore::new()), 60));
    let mail = Arc::new(CapturingMail::default());

    let auth_service = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        sessions,
        verification,
        mail.clone(),
        AuthServiceConfig {
            bcrypt_cost: 4,
            code_ttl_seconds: 60,
        },
    ));

    (
        web::Data::new(AppState::new(auth_service, token_service)),
        mail,
    )
}
