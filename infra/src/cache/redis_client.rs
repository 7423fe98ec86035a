//! Redis connection used by the verification code store
//!
//! Exposes only what [`RedisCodeStore`](crate::cache::RedisCodeStore) and
//! start-up need: keyed `SET EX`, `DEL`, Lua script invocation and `PING`.
//! Transient failures are retried with exponential backoff.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use dfm_shared::config::CacheConfig;

use crate::InfrastructureError;

type Pending<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 5000;

/// Shared Redis connection with retry on transient errors
///
/// Clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to `config.url`, retrying refused or timed-out attempts
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str())
            .map_err(|e| InfrastructureError::Config(format!("Invalid Redis URL: {}", e)))?;
        let connect_timeout = Duration::from_secs(config.connection_timeout);

        let mut backoff = Backoff::new();
        let connection = loop {
            let attempt = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Redis connection timed out",
                ))),
            };

            match attempt {
                Ok(connection) => break connection,
                Err(e) if backoff.can_retry() => {
                    warn!(error = %e, attempt = backoff.attempt, "Redis connection failed, retrying");
                    backoff.wait().await;
                }
                Err(e) => {
                    error!(error = %e, attempts = backoff.attempt, "Giving up on Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        };

        info!("Connected to Redis");
        Ok(Self { connection, config })
    }

    /// Apply the configured key prefix
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// `SET key value EX expiry_seconds`, replacing any previous value
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.with_retry("SET", move |mut conn| {
            let (key, value) = (key.clone(), value.clone());
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
    }

    /// Delete `key`; `true` when it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        let removed: u32 = self
            .with_retry("DEL", move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;
        Ok(removed > 0)
    }

    /// Run a Lua script atomically and return its integer reply
    pub async fn invoke_script(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<i64, InfrastructureError> {
        let (script, keys, args) = (script.clone(), keys.to_vec(), args.to_vec());
        self.with_retry("EVALSHA", move |mut conn| {
            let (script, keys, args) = (script.clone(), keys.clone(), args.clone());
            Box::pin(async move {
                let mut invocation = script.prepare_invoke();
                for key in &keys {
                    invocation.key(key);
                }
                for arg in &args {
                    invocation.arg(arg);
                }
                invocation.invoke_async::<_, i64>(&mut conn).await
            })
        })
        .await
    }

    /// `PING`; used at start-up before the server accepts requests
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let reply: String = self
            .with_retry("PING", |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if reply != "PONG" {
            warn!(reply = %reply, "Unexpected PING reply");
        }
        Ok(reply == "PONG")
    }

    async fn with_retry<F, T>(&self, command: &'static str, operation: F) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> Pending<T>,
    {
        let mut backoff = Backoff::new();
        loop {
            match operation(self.connection.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if backoff.can_retry() && is_retriable_error(&e) => {
                    warn!(command, error = %e, attempt = backoff.attempt, "Redis command failed, retrying");
                    backoff.wait().await;
                }
                Err(e) => {
                    error!(command, error = %e, "Redis command failed");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }
}

/// Attempt counter with doubling delay
pub(crate) struct Backoff {
    pub(crate) attempt: u32,
    pub(crate) delay_ms: u64,
}

impl Backoff {
    pub(crate) fn new() -> Self {
        Self {
            attempt: 1,
            delay_ms: BASE_BACKOFF_MS,
        }
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.attempt < MAX_ATTEMPTS
    }

    pub(crate) async fn wait(&mut self) {
        debug!(delay_ms = self.delay_ms, "Backing off");
        sleep(Duration::from_millis(self.delay_ms)).await;
        self.attempt += 1;
        self.delay_ms = (self.delay_ms * 2).min(MAX_BACKOFF_MS);
    }
}

/// Whether a Redis error is transient and worth another attempt
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL before logging it
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}
