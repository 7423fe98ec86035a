use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::{RefreshCoordinator, RefreshTransport};
use crate::error::ClientError;
use crate::session::{SessionEvents, SessionStatus};
use crate::token_cache::{ClientTokenCache, MemorySecureStorage, SecureStorage, TokenPair};

/// Transport that takes a while and counts its calls
struct SlowTransport {
    calls: AtomicUsize,
    outcome: Result<(), ClientError>,
}

impl SlowTransport {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome: Ok(()),
        })
    }

    fn failing(error: ClientError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome: Err(error),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshTransport for SlowTransport {
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(200)).await;

        self.outcome.clone()?;
        Ok(TokenPair::new(
            format!("access-{}", call),
            format!("{}-next", refresh_token),
        ))
    }
}

async fn setup(
    transport: Arc<SlowTransport>,
    cached: Option<TokenPair>,
) -> (RefreshCoordinator, ClientTokenCache, SessionEvents) {
    let cache = ClientTokenCache::new(Arc::new(MemorySecureStorage::new()));
    if let Some(pair) = cached {
        cache.set(&pair).await.unwrap();
    }
    let session = SessionEvents::new(SessionStatus::SignedIn);
    let coordinator = RefreshCoordinator::new(cache.clone(), transport, session.clone());
    (coordinator, cache, session)
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_rotation() {
    let transport = SlowTransport::succeeding();
    let (coordinator, cache, session) =
        setup(transport.clone(), Some(TokenPair::new("stale", "r1"))).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move { coordinator.refresh("stale").await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok("access-1".to_string()));
    }

    assert_eq!(transport.calls(), 1);
    assert_eq!(cache.get().await, Some(TokenPair::new("access-1", "r1-next")));
    assert_eq!(session.current(), SessionStatus::SignedIn);
    assert!(!coordinator.is_refreshing().await);
}

#[tokio::test(start_paused = true)]
async fn test_failure_rejects_all_callers_and_signs_out() {
    let transport = SlowTransport::failing(ClientError::RefreshRejected);
    let (coordinator, cache, session) =
        setup(transport.clone(), Some(TokenPair::new("stale", "r1"))).await;
    let mut status = session.subscribe();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move { coordinator.refresh("stale").await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Err(ClientError::RefreshRejected));
    }

    assert_eq!(transport.calls(), 1);
    assert_eq!(cache.get().await, None);
    status.changed().await.unwrap();
    assert_eq!(*status.borrow(), SessionStatus::SignedOut);
}

#[tokio::test(start_paused = true)]
async fn test_transport_timeout_ends_the_session() {
    let transport = SlowTransport::failing(ClientError::Transport("timed out".to_string()));
    let (coordinator, cache, session) =
        setup(transport, Some(TokenPair::new("stale", "r1"))).await;

    let result = coordinator.refresh("stale").await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
    assert_eq!(cache.get().await, None);
    assert_eq!(session.current(), SessionStatus::SignedOut);
}

#[tokio::test(start_paused = true)]
async fn test_no_refresh_token_makes_no_call() {
    let transport = SlowTransport::succeeding();
    let (coordinator, _cache, session) = setup(transport.clone(), None).await;

    let result = coordinator.refresh("whatever").await;

    assert_eq!(result, Err(ClientError::RefreshExhausted));
    assert_eq!(transport.calls(), 0);
    assert_eq!(session.current(), SessionStatus::SignedOut);
}

#[tokio::test(start_paused = true)]
async fn test_late_caller_reuses_finished_rotation() {
    let transport = SlowTransport::succeeding();
    let (coordinator, _cache, _session) =
        setup(transport.clone(), Some(TokenPair::new("stale", "r1"))).await;

    assert_eq!(coordinator.refresh("stale").await, Ok("access-1".to_string()));

    // A request sent with the old token fails after the rotation finished
    assert_eq!(coordinator.refresh("stale").await, Ok("access-1".to_string()));
    assert_eq!(transport.calls(), 1);

    // The new token failing as well does rotate again
    assert_eq!(coordinator.refresh("access-1").await, Ok("access-2".to_string()));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_caller_does_not_strand_others() {
    let transport = SlowTransport::succeeding();
    let (coordinator, _cache, _session) =
        setup(transport.clone(), Some(TokenPair::new("stale", "r1"))).await;

    let starter = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.refresh("stale").await })
    };
    while !coordinator.is_refreshing().await {
        tokio::task::yield_now().await;
    }

    let follower = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.refresh("stale").await })
    };
    tokio::task::yield_now().await;
    starter.abort();

    assert_eq!(follower.await.unwrap(), Ok("access-1".to_string()));
    assert_eq!(transport.calls(), 1);
}

/// Storage whose reads return a snapshot only after a delay, like a keychain
#[derive(Default)]
struct SlowReadStorage {
    inner: MemorySecureStorage,
    slow: AtomicBool,
}

#[async_trait]
impl SecureStorage for SlowReadStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        let value = self.inner.read(key).await?;
        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(value)
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), ClientError> {
        self.inner.delete(key).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_cache_read_joins_running_rotation() {
    let transport = SlowTransport::succeeding();
    let storage = Arc::new(SlowReadStorage::default());
    let cache = ClientTokenCache::new(storage.clone());
    cache.set(&TokenPair::new("stale", "r1")).await.unwrap();
    let coordinator = RefreshCoordinator::new(
        cache.clone(),
        transport.clone(),
        SessionEvents::new(SessionStatus::SignedIn),
    );

    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.refresh("stale").await })
    };
    while !coordinator.is_refreshing().await {
        tokio::task::yield_now().await;
    }

    // Reads now outlast the rotation that is already in flight
    storage.slow.store(true, Ordering::SeqCst);
    let second = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.refresh("stale").await })
    };

    assert_eq!(first.await.unwrap(), Ok("access-1".to_string()));
    assert_eq!(second.await.unwrap(), Ok("access-1".to_string()));
    assert_eq!(transport.calls(), 1);
}
