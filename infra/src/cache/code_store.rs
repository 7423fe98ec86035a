//! Redis-backed verification code store
//!
//! Key pattern: `verification:code:{email}:{username}` holding the SHA-256
//! hex digest of the code, with the code's TTL as the key expiry.
//! Confirmation runs as a Lua script so that comparing and deleting is one
//! atomic step on the server.

use async_trait::async_trait;
use redis::Script;
use sha2::{Digest, Sha256};
use std::time::Duration;

use dfm_core::domain::entities::verification_code::CodeIdentity;
use dfm_core::errors::DomainError;
use dfm_core::services::verification::{CodeStore, ConfirmOutcome};

use crate::cache::RedisClient;

/// Returns 1 when the digest matched and the key was deleted, 0 on a
/// mismatch (key untouched) and -1 when no key exists.
const COMPARE_AND_DELETE: &str = r#"
local stored = redis.call('GET', KEYS[1])
if not stored then
    return -1
end
if stored == ARGV[1] then
    redis.call('DEL', KEYS[1])
    return 1
end
return 0
"#;

/// Verification code store on Redis
#[derive(Clone)]
pub struct RedisCodeStore {
    redis_client: RedisClient,
    compare_and_delete: Script,
}

impl RedisCodeStore {
    pub fn new(redis_client: RedisClient) -> Self {
        Self {
            redis_client,
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        }
    }

    /// Unprefixed key for an identity
    pub(crate) fn format_code_key(identity: &CodeIdentity) -> String {
        format!("verification:code:{}", identity.key())
    }

    /// Codes are stored as SHA-256 digests, never in clear
    pub(crate) fn hash_code(code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub(crate) fn outcome_from_reply(reply: i64) -> ConfirmOutcome {
        match reply {
            1 => ConfirmOutcome::Confirmed,
            0 => ConfirmOutcome::Mismatch,
            _ => ConfirmOutcome::Missing,
        }
    }

    fn key_for(&self, identity: &CodeIdentity) -> String {
        self.redis_client.make_key(&Self::format_code_key(identity))
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn replace(
        &self,
        identity: &CodeIdentity,
        code: &str,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        // SET with EX overwrites value and expiry in one command
        let ttl_seconds = ttl.as_secs().max(1);
        self.redis_client
            .set_with_expiry(&self.key_for(identity), &Self::hash_code(code), ttl_seconds)
            .await?;
        Ok(())
    }

    async fn take_if_matches(
        &self,
        identity: &CodeIdentity,
        code: &str,
    ) -> Result<ConfirmOutcome, DomainError> {
        let reply = self
            .redis_client
            .invoke_script(
                &self.compare_and_delete,
                &[self.key_for(identity)],
                &[Self::hash_code(code)],
            )
            .await?;

        Ok(Self::outcome_from_reply(reply))
    }

    async fn invalidate(&self, identity: &CodeIdentity) -> Result<bool, DomainError> {
        Ok(self.redis_client.delete(&self.key_for(identity)).await?)
    }
}
