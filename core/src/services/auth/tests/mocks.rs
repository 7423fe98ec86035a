//! Mock collaborators for authentication tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::services::verification::MailService;

/// Mail service that records every delivery
#[derive(Clone, Default)]
pub struct MockMailService {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub should_fail: bool,
}

impl MockMailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Last code delivered to `email`
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
impl MailService for MockMailService {
    async fn send_verification_code(
        &self,
        email: &str,
        _subject: &str,
        code: &str,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mail service unavailable".to_string());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((email.to_string(), code.to_string()));
        Ok(format!("mail-{}", sent.len()))
    }
}
