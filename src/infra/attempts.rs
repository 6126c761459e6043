//! Login-attempt counter.
//!
//! Tracked per username behind an injectable interface so a future
//! distributed deployment can swap the store without touching callers.
//! The Redis implementation is process-shared but single-instance in
//! spirit: counters are monotonic within their window and reset atomically
//! on successful login or admin unlock.

use async_trait::async_trait;

use super::cache::Cache;
use crate::config::{CACHE_PREFIX_LOGIN_ATTEMPTS, LOGIN_LOCKOUT_SECONDS, MAX_LOGIN_FAILURES};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Per-username failed-login counter.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LoginAttempts: Send + Sync {
    /// Current consecutive failure count
    async fn failures(&self, username: &str) -> AppResult<u32>;

    /// Record one failure, returning the new count
    async fn record_failure(&self, username: &str) -> AppResult<u32>;

    /// Clear the counter (successful login or admin unlock)
    async fn reset(&self, username: &str) -> AppResult<()>;

    /// Seconds until the lockout expires, None when the account is not locked
    async fn lockout_remaining(&self, username: &str) -> AppResult<Option<u64>>;
}

/// Redis-backed implementation of LoginAttempts.
pub struct RedisLoginAttempts {
    cache: Cache,
}

impl RedisLoginAttempts {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn key(username: &str) -> String {
        format!("{}{}", CACHE_PREFIX_LOGIN_ATTEMPTS, username)
    }
}

#[async_trait]
impl LoginAttempts for RedisLoginAttempts {
    async fn failures(&self, username: &str) -> AppResult<u32> {
        Ok(self.cache.get_counter(&Self::key(username)).await? as u32)
    }

    async fn record_failure(&self, username: &str) -> AppResult<u32> {
        let key = Self::key(username);
        let count = self.cache.incr(&key).await? as u32;

        if count >= MAX_LOGIN_FAILURES {
            // The locking failure restarts the window so the lockout runs
            // its full duration from this moment
            self.cache.expire(&key, LOGIN_LOCKOUT_SECONDS).await?;
        } else if count == 1 {
            self.cache.expire(&key, LOGIN_LOCKOUT_SECONDS).await?;
        }

        Ok(count)
    }

    async fn reset(&self, username: &str) -> AppResult<()> {
        self.cache.delete(&Self::key(username)).await
    }

    async fn lockout_remaining(&self, username: &str) -> AppResult<Option<u64>> {
        let key = Self::key(username);
        let count = self.cache.get_counter(&key).await? as u32;

        if count < MAX_LOGIN_FAILURES {
            return Ok(None);
        }

        // Locked; the counter's TTL is the remaining lockout
        Ok(Some(
            self.cache.ttl(&key).await?.unwrap_or(LOGIN_LOCKOUT_SECONDS),
        ))
    }
}
