use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

use crate::error::ClientError;
use crate::session::{SessionEvents, SessionStatus};
use crate::token_cache::{ClientTokenCache, TokenPair};

/// Exchanges a refresh token for a new pair
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Spend `refresh_token` on the server and return its successor pair
    ///
    /// A rejected token is `ClientError::RefreshRejected`; timeouts and
    /// network failures are `ClientError::Transport`.
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, ClientError>;
}

type Waiter = oneshot::Sender<Result<String, ClientError>>;

/// Rotation state, guarded by `Inner::state`
enum RefreshState {
    /// No rotation in flight
    Idle,
    /// One rotation in flight; `waiters` get its outcome
    Refreshing { waiters: Vec<Waiter> },
}

struct Inner {
    state: Mutex<RefreshState>,
    cache: ClientTokenCache,
    transport: Arc<dyn RefreshTransport>,
    session: SessionEvents,
}

/// Serializes refresh token rotation for one client
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Coordinator over `cache`, rotating through `transport` and announcing
    /// sign-out on `session`
    pub fn new(
        cache: ClientTokenCache,
        transport: Arc<dyn RefreshTransport>,
        session: SessionEvents,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RefreshState::Idle),
                cache,
                transport,
                session,
            }),
        }
    }

    /// Obtain a fresh access token after `failed_access_token` was rejected
    ///
    /// A caller arriving while a rotation runs joins it. When idle and the
    /// cache already holds a different access token, a rotation finished
    /// after the failing request was sent and its token is returned without
    /// contacting the server. Otherwise the caller starts a rotation.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The access token to replay the request with
    /// * `Err(ClientError)` - The session is over; the cache has been
    ///   cleared and `SignedOut` published
    pub async fn refresh(&self, failed_access_token: &str) -> Result<String, ClientError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.inner.state.lock().await;
            match &mut *state {
                RefreshState::Refreshing { waiters } => waiters.push(sender),
                RefreshState::Idle => {
                    // Read under the lock: a rotation persists its pair
                    // before it returns to `Idle`
                    if let Some(pair) = self.inner.cache.get().await {
                        if !failed_access_token.is_empty()
                            && pair.access_token != failed_access_token
                        {
                            return Ok(pair.access_token);
                        }
                    }

                    *state = RefreshState::Refreshing {
                        waiters: vec![sender],
                    };
                    // Spawned so that a dropped caller cannot strand the queue
                    tokio::spawn(Arc::clone(&self.inner).run_rotation());
                }
            }
        }

        receiver.await.unwrap_or(Err(ClientError::SignedOut))
    }

    /// Whether a rotation is in flight
    pub async fn is_refreshing(&self) -> bool {
        matches!(
            *self.inner.state.lock().await,
            RefreshState::Refreshing { .. }
        )
    }
}

impl Inner {
    async fn run_rotation(self: Arc<Self>) {
        let outcome = self.rotate_once().await;

        match &outcome {
            Ok(_) => tracing::debug!(event = "refresh_completed", "Session tokens rotated"),
            Err(error) => {
                tracing::warn!(error = %error, event = "refresh_failed", "Session refresh failed");
                if let Err(clear_error) = self.cache.clear().await {
                    tracing::error!(error = %clear_error, "Failed to clear cached session");
                }
                self.session.publish(SessionStatus::SignedOut);
            }
        }

        let waiters = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        for waiter in waiters {
            // A dropped receiver only means that caller stopped waiting
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn rotate_once(&self) -> Result<String, ClientError> {
        let pair = self.cache.get().await.ok_or(ClientError::RefreshExhausted)?;
        let rotated = self.transport.rotate(&pair.refresh_token).await?;
        self.cache.set(&rotated).await?;
        Ok(rotated.access_token)
    }
}
