//! Session status published to the application
//!
//! The UI subscribes to learn when the user has to be sent back to the
//! sign-in screen, whatever component noticed it.

use std::sync::Arc;

use tokio::sync::watch;

/// Whether the client currently holds a usable session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedIn,
    SignedOut,
}

/// Broadcasts [`SessionStatus`] changes to any number of subscribers
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: Arc<watch::Sender<SessionStatus>>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(SessionStatus::SignedOut)
    }
}

impl SessionEvents {
    pub fn new(initial: SessionStatus) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Receiver that observes the current status and every later change
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> SessionStatus {
        *self.sender.borrow()
    }

    /// Publish a status; works with or without subscribers
    pub fn publish(&self, status: SessionStatus) {
        let previous = self.sender.send_replace(status);

        if previous != status {
            match status {
                SessionStatus::SignedIn => {
                    tracing::info!(event = "session_signed_in", "Session established")
                }
                SessionStatus::SignedOut => {
                    tracing::info!(event = "session_signed_out", "Session ended")
                }
            }
        }
    }
}
