//! Result types for the authentication flows

use serde::{Deserialize, Serialize};

/// Outcome of any flow that mails a verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResult {
    /// Address the code was sent to
    pub email: String,
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Identifier returned by the mail collaborator
    pub message_id: String,
}
