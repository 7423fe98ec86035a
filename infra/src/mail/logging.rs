//! Mail service that logs deliveries instead of sending them

use async_trait::async_trait;
use uuid::Uuid;

use dfm_core::domain::entities::verification_code::CodeIdentity;
use dfm_core::services::verification::MailService;

/// Development mail service
///
/// Logs a masked delivery notice. The code itself is never logged.
#[derive(Debug, Clone)]
pub struct LoggingMailService {
    sender: String,
}

impl LoggingMailService {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl Default for LoggingMailService {
    fn default() -> Self {
        Self::new("DF-Messenger")
    }
}

#[async_trait]
impl MailService for LoggingMailService {
    async fn send_verification_code(
        &self,
        email: &str,
        subject: &str,
        _code: &str,
    ) -> Result<String, String> {
        let message_id = Uuid::new_v4().to_string();
        let masked = CodeIdentity::new(email, "").masked_email();

        tracing::info!(
            sender = %self.sender,
            to = %masked,
            subject = subject,
            message_id = %message_id,
            event = "mail_dispatched",
            "Verification mail recorded (delivery disabled)"
        );

        Ok(message_id)
    }
}
